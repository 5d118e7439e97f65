use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::{Duration, Instant},
};

/// A shared flag that can be raised once and waited on. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.lock() = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Sleeps for `timeout`, or less if cancelled in the meantime. Returns true if the
    /// token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.lock();
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = match self.inner.condvar.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        *cancelled
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // NOTE: a bool can't be left half-updated, so a poisoned lock is fine to reuse
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wait_runs_out() {
        let token = CancelToken::new();
        let before = Instant::now();
        assert!(!token.wait_timeout(Duration::from_millis(20)));
        assert!(before.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cancel_interrupts_wait() {
        let token = CancelToken::new();
        let other = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            other.cancel();
        });

        let before = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(30)));
        assert!(before.elapsed() < Duration::from_secs(30));
        handle.join().unwrap();
    }

    #[test]
    fn already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.wait_timeout(Duration::ZERO));
        assert!(token.clone().is_cancelled());
    }
}
