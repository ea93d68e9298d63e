pub mod merge;
pub mod order_store;

pub use merge::{merge, MergeResult};
pub use order_store::{MergeOutcome, OrderStore, SharedOrderStore};
