pub mod order;

pub use order::{LifecycleStatus, Order, OrderPatch, PaymentStatus};
