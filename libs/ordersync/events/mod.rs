pub mod normalizer;
pub mod types;

pub use normalizer::normalize;
pub use types::{DiscardReason, EventEnvelope, EventKind};
