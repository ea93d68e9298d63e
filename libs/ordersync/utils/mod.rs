//! Shared runtime utilities

mod shutdown;

pub use shutdown::ShutdownManager;
