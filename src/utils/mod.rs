pub mod backoff;
pub mod logging;

pub use backoff::{execute, BackoffPolicy};
