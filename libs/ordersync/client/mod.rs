pub mod rest;
pub mod types;

pub use rest::{ApiError, OrderApi, RestOrderApi};
pub use types::{OrderDraft, OrderRecord, OrderUpdate};
