// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Watchdog tick thread: drives SM timeouts and CC rotation on a
//! dedicated thread, single-flighted via a CAS lock so an on-demand
//! caller and the periodic thread never run a tick concurrently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::exitflag::ExitFlag;

use super::state::TrunkingStateMachine;

/// Clamp a configured cadence (milliseconds) to the allowed [20, 2000] ms
/// range, regardless of what configuration requested.
pub fn clamp_cadence_ms(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(20, 2000))
}

/// Default cadence for UI-attached runs.
pub const DEFAULT_CADENCE_UI: Duration = Duration::from_millis(200);
/// Default cadence for headless runs.
pub const DEFAULT_CADENCE_HEADLESS: Duration = Duration::from_millis(400);

/// CAS-guarded single-flight gate around `TrunkingStateMachine::tick`.
pub struct Watchdog {
    running: AtomicBool,
    in_tick: AtomicBool,
    cadence: Mutex<Duration>,
    exit: ExitFlag,
}

impl Watchdog {
    pub fn new(cadence: Duration, exit: ExitFlag) -> Self {
        Self {
            running: AtomicBool::new(false),
            in_tick: AtomicBool::new(false),
            cadence: Mutex::new(cadence),
            exit,
        }
    }

    pub fn set_cadence(&self, cadence: Duration) {
        *self.cadence.lock().expect("cadence lock poisoned") = cadence;
    }

    pub fn cadence(&self) -> Duration {
        *self.cadence.lock().expect("cadence lock poisoned")
    }

    /// Whether a tick is currently in flight, observable by nested
    /// on-demand callers deciding whether to wait or skip.
    pub fn is_in_tick(&self) -> bool {
        self.in_tick.load(Ordering::Acquire)
    }

    /// Attempt to run `f` as a tick. Returns `false` without running `f`
    /// if another tick is already in flight.
    pub fn try_tick(&self, f: impl FnOnce()) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.in_tick.store(true, Ordering::Release);
        f();
        self.in_tick.store(false, Ordering::Release);
        self.running.store(false, Ordering::Release);
        true
    }

    /// Spawn the periodic watchdog thread driving `sm.tick()` at the
    /// current cadence until `exit` is signaled.
    pub fn spawn(self: Arc<Self>, sm: Arc<Mutex<TrunkingStateMachine>>) -> JoinHandle<()> {
        thread::spawn(move || {
            while !self.exit.is_set() {
                let cadence = self.cadence();
                thread::sleep(cadence);
                if self.exit.is_set() {
                    break;
                }
                self.try_tick(|| {
                    let mut guard = sm.lock().expect("trunking state machine lock poisoned");
                    guard.tick(Instant::now());
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_clamps_to_allowed_range() {
        assert_eq!(clamp_cadence_ms(1), Duration::from_millis(20));
        assert_eq!(clamp_cadence_ms(50_000), Duration::from_millis(2000));
        assert_eq!(clamp_cadence_ms(250), Duration::from_millis(250));
    }

    #[test]
    fn try_tick_runs_when_not_already_in_flight() {
        let wd = Watchdog::new(Duration::from_millis(100), ExitFlag::new());
        let mut ran = false;
        let ok = wd.try_tick(|| ran = true);
        assert!(ok);
        assert!(ran);
        assert!(!wd.is_in_tick());
    }

    #[test]
    fn concurrent_tick_attempt_is_rejected() {
        let wd = Arc::new(Watchdog::new(Duration::from_millis(100), ExitFlag::new()));
        let wd2 = wd.clone();
        let started = Arc::new(std::sync::Barrier::new(2));
        let started2 = started.clone();

        let handle = thread::spawn(move || {
            wd2.try_tick(|| {
                started2.wait();
                thread::sleep(Duration::from_millis(50));
            })
        });

        started.wait();
        thread::sleep(Duration::from_millis(5));
        let rejected = wd.try_tick(|| {});
        assert!(!rejected);

        assert!(handle.join().unwrap());
    }
}
