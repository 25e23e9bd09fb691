// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Rate-limited diagnostic reporting: missing-channel, deferred-release,
//! and similar conditions that would otherwise flood the log once per
//! frame are suppressed to one line per key within a window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// What a rate-limited diagnostic is about; combined with a `key` (e.g.
/// a channel16 or a talkgroup) to form the suppression bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagKind {
    MissingChannel,
    DeferredRelease,
    EncLockout,
}

impl DiagKind {
    fn label(self) -> &'static str {
        match self {
            DiagKind::MissingChannel => "missing-channel",
            DiagKind::DeferredRelease => "deferred-release",
            DiagKind::EncLockout => "enc-lockout",
        }
    }
}

/// Suppresses repeat warnings for the same `(kind, key)` pair within a
/// configurable window, so a continuously-failing channel lookup logs
/// once instead of once per frame.
pub struct DiagLimiter {
    window: Duration,
    last_emit: Mutex<HashMap<(DiagKind, u64), Instant>>,
}

impl DiagLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_emit: Mutex::new(HashMap::new()),
        }
    }

    /// Report a diagnostic. Emits a `tracing::warn!` at most once per
    /// `(kind, key)` per window; returns whether it was actually emitted
    /// (useful for tests).
    pub fn report(&self, kind: DiagKind, key: u64, detail: &str) -> bool {
        let now = Instant::now();
        let mut guard = self.last_emit.lock().expect("diag limiter poisoned");
        let should_emit = match guard.get(&(kind, key)) {
            Some(last) => now.duration_since(*last) >= self.window,
            None => true,
        };
        if should_emit {
            guard.insert((kind, key), now);
            drop(guard);
            tracing::warn!(kind = kind.label(), key, detail, "rate-limited diagnostic");
        }
        should_emit
    }
}

impl Default for DiagLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_report_within_window_is_suppressed() {
        let limiter = DiagLimiter::new(Duration::from_secs(60));
        assert!(limiter.report(DiagKind::MissingChannel, 0x1000, "first"));
        assert!(!limiter.report(DiagKind::MissingChannel, 0x1000, "second"));
    }

    #[test]
    fn different_keys_are_independent() {
        let limiter = DiagLimiter::new(Duration::from_secs(60));
        assert!(limiter.report(DiagKind::MissingChannel, 0x1000, "a"));
        assert!(limiter.report(DiagKind::MissingChannel, 0x2000, "b"));
    }

    #[test]
    fn different_kinds_same_key_are_independent() {
        let limiter = DiagLimiter::new(Duration::from_secs(60));
        assert!(limiter.report(DiagKind::MissingChannel, 0x1000, "a"));
        assert!(limiter.report(DiagKind::DeferredRelease, 0x1000, "b"));
    }

    #[test]
    fn report_is_allowed_again_after_window_elapses() {
        let limiter = DiagLimiter::new(Duration::from_millis(10));
        assert!(limiter.report(DiagKind::EncLockout, 1, "a"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.report(DiagKind::EncLockout, 1, "b"));
    }
}
