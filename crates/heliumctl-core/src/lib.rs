pub mod cache;
pub mod retry;
pub mod time;

pub use cache::TtlCache;
pub use retry::{DelayPolicy, RetryPolicy, with_retry};
