//! Debounced re-extraction for hosts that watch a live document.
//!
//! The scheduler never reads a clock itself. Hosts report each mutation with
//! the time it was observed and ask [`RefreshScheduler::poll`] whether a
//! refresh is due, which keeps the debounce logic deterministic under test.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Who caused a document mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    /// The page itself or the user.
    External,
    /// An apply pass run by this engine.
    SelfApply,
}

/// Coalesces bursts of external mutations into one refresh per quiet period.
#[derive(Debug)]
pub struct RefreshScheduler {
    quiet_period: Duration,
    last_mutation: Option<Instant>,
    suppressed: Arc<AtomicUsize>,
}

/// While alive, every mutation reported to the scheduler is ignored.
#[derive(Debug)]
#[must_use = "suppression ends when the guard is dropped"]
pub struct SuppressGuard {
    depth: Arc<AtomicUsize>,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RefreshScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_mutation: None,
            suppressed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record a mutation observed at `at`. Returns whether it was counted.
    pub fn note_mutation(&mut self, at: Instant, origin: MutationOrigin) -> bool {
        if origin == MutationOrigin::SelfApply || self.is_suppressed() {
            tracing::trace!(?origin, "mutation ignored");
            return false;
        }
        self.last_mutation = Some(at);
        true
    }

    /// Whether a refresh is due at `now`. A due refresh is consumed, so the
    /// next call returns `false` until another mutation arrives.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_mutation {
            Some(last) if now.saturating_duration_since(last) >= self.quiet_period => {
                self.last_mutation = None;
                true
            }
            _ => false,
        }
    }

    /// When the pending refresh becomes due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_mutation.map(|last| last + self.quiet_period)
    }

    pub fn is_pending(&self) -> bool {
        self.last_mutation.is_some()
    }

    /// Ignore mutations until the returned guard is dropped. Guards nest.
    pub fn suppress_self(&self) -> SuppressGuard {
        self.suppressed.fetch_add(1, Ordering::SeqCst);
        SuppressGuard {
            depth: Arc::clone(&self.suppressed),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst) > 0
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_QUIET_PERIOD_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(200);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_yields_one_refresh() {
        let mut s = RefreshScheduler::new(QUIET);
        let t0 = Instant::now();
        for i in 0..10 {
            assert!(s.note_mutation(t0 + ms(i * 50), MutationOrigin::External));
        }
        // Last mutation at 450ms.
        assert!(!s.poll(t0 + ms(600)));
        assert_eq!(s.deadline(), Some(t0 + ms(650)));
        assert!(s.poll(t0 + ms(650)));
        assert!(!s.poll(t0 + ms(2000)));
        assert!(!s.is_pending());
    }

    #[test]
    fn test_no_mutation_no_refresh() {
        let mut s = RefreshScheduler::default();
        assert_eq!(s.quiet_period(), QUIET);
        assert!(!s.poll(Instant::now() + ms(10_000)));
    }

    #[test]
    fn test_self_mutations_ignored() {
        let mut s = RefreshScheduler::new(QUIET);
        let t0 = Instant::now();
        assert!(!s.note_mutation(t0, MutationOrigin::SelfApply));
        {
            let _outer = s.suppress_self();
            let _inner = s.suppress_self();
            assert!(!s.note_mutation(t0, MutationOrigin::External));
        }
        assert!(!s.is_suppressed());
        assert!(!s.poll(t0 + ms(500)));

        assert!(s.note_mutation(t0 + ms(500), MutationOrigin::External));
        assert!(s.poll(t0 + ms(700)));
    }
}
