//! Services module.

pub mod clustering;
pub mod dictionary;
pub mod labeling;
pub mod merge;
pub mod orchestrator;
pub mod reduction;
pub mod text;
pub mod vector_ops;

pub use clustering::ClusterParams;
pub use orchestrator::TopicOrchestrator;
pub use vector_ops::VectorOps;
