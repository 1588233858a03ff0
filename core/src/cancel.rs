//! Cooperative cancellation for a running simulation.
//!
//! The engine polls the token between iterations only. Clones share the
//! same flag, so a handle can be given to another thread or a signal
//! handler while the engine keeps its own.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag:     Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires when `cancel()` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also fires once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag:     Arc::default(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn elapsed_deadline_cancels() {
        assert!(CancelToken::with_timeout(Duration::ZERO).is_cancelled());
        assert!(!CancelToken::with_timeout(Duration::from_secs(3600)).is_cancelled());
    }
}
