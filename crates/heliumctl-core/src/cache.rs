use std::time::{Duration, Instant};

/// Default freshness window for parsed store snapshots.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Single-value read-through cache with a fixed time-to-live.
///
/// Owned by the command session and passed explicitly; callers must
/// `invalidate` after any mutation that touches the backing store.
#[derive(Debug)]
pub struct TtlCache<T> {
    value: Option<T>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            value: None,
            fetched_at: None,
            ttl,
        }
    }

    /// The cached value, or `None` when empty or past its TTL.
    pub fn get(&self) -> Option<&T> {
        if self.is_fresh() {
            self.value.as_ref()
        } else {
            None
        }
    }

    pub fn put(&mut self, value: T) {
        self.value = Some(value);
        self.fetched_at = Some(Instant::now());
    }

    pub fn invalidate(&mut self) {
        self.value = None;
        self.fetched_at = None;
    }

    pub fn is_fresh(&self) -> bool {
        match (&self.value, self.fetched_at) {
            (Some(_), Some(at)) => at.elapsed() <= self.ttl,
            _ => false,
        }
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
