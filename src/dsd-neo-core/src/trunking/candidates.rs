// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Control-channel candidate tracking: neighbor frequencies learned from
//! the CC, with cooldown after use and a rotating next-candidate cursor.

use std::time::Instant;

const MAX_CANDIDATES: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    freq_hz: u64,
    cool_until: Option<Instant>,
}

/// Up to 16 known control-channel candidates, de-duplicated on insert,
/// with cooldown-aware round-robin selection.
#[derive(Debug, Default)]
pub struct CcCandidates {
    entries: Vec<Candidate>,
    idx: usize,
    pub added: u64,
    pub used: u64,
}

impl CcCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a neighbor frequency. Duplicates (by frequency) are
    /// rejected without bumping `added`. The table caps at 16 entries;
    /// once full, further distinct insertions are dropped.
    pub fn insert(&mut self, freq_hz: u64) -> bool {
        if self.entries.iter().any(|c| c.freq_hz == freq_hz) {
            return false;
        }
        if self.entries.len() >= MAX_CANDIDATES {
            return false;
        }
        self.entries.push(Candidate {
            freq_hz,
            cool_until: None,
        });
        self.added += 1;
        true
    }

    /// Put `freq_hz` on cooldown until `now + duration`, without
    /// resetting a cooldown that hasn't elapsed yet (monotonicity: a
    /// re-add before `cool_until` does not shorten it).
    pub fn cool_down(&mut self, freq_hz: u64, now: Instant, duration: std::time::Duration) {
        if let Some(c) = self.entries.iter_mut().find(|c| c.freq_hz == freq_hz) {
            let candidate_until = now + duration;
            c.cool_until = Some(match c.cool_until {
                Some(existing) if existing > candidate_until => existing,
                _ => candidate_until,
            });
        }
    }

    /// Scan from the current cursor, skipping cooled-down entries,
    /// returning the first usable candidate and advancing the cursor
    /// past it. Returns `None` after a full wrap with nothing usable.
    pub fn next_candidate(&mut self, now: Instant) -> Option<u64> {
        if self.entries.is_empty() {
            return None;
        }
        let n = self.entries.len();
        for step in 0..n {
            let i = (self.idx + step) % n;
            let usable = match self.entries[i].cool_until {
                Some(until) => until <= now,
                None => true,
            };
            if usable {
                self.idx = (i + 1) % n;
                self.used += 1;
                return Some(self.entries[i].freq_hz);
            }
        }
        None
    }

    /// Current rotation cursor, exposed so callers can decide whether a
    /// `force_release` should reset it (current design choice: preserve
    /// it — see repository design notes).
    pub fn cursor(&self) -> usize {
        self.idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn duplicate_insert_does_not_bump_added() {
        let mut c = CcCandidates::new();
        assert!(c.insert(851_000_000));
        assert!(!c.insert(851_000_000));
        assert_eq!(c.added, 1);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn next_n_times_returns_each_distinct_frequency_once_before_wrap() {
        let mut c = CcCandidates::new();
        let freqs = [851_000_000u64, 852_000_000, 853_000_000];
        for f in freqs {
            c.insert(f);
        }
        let now = Instant::now();
        let mut seen = Vec::new();
        for _ in 0..freqs.len() {
            seen.push(c.next_candidate(now).unwrap());
        }
        seen.sort_unstable();
        let mut expected = freqs.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn cooled_entry_is_skipped_until_elapsed() {
        let mut c = CcCandidates::new();
        c.insert(1);
        c.insert(2);
        let now = Instant::now();
        c.cool_down(1, now, Duration::from_secs(60));
        assert_eq!(c.next_candidate(now), Some(2));
        assert_eq!(c.next_candidate(now), None);
    }

    #[test]
    fn cooldown_is_monotonic_not_shortened_by_reinsert() {
        let mut c = CcCandidates::new();
        c.insert(1);
        let now = Instant::now();
        c.cool_down(1, now, Duration::from_secs(120));
        // A shorter cooldown request does not shorten the existing one.
        c.cool_down(1, now, Duration::from_secs(5));
        assert_eq!(c.next_candidate(now + Duration::from_secs(10)), None);
    }

    #[test]
    fn capacity_caps_at_sixteen() {
        let mut c = CcCandidates::new();
        for i in 0..20u64 {
            c.insert(i);
        }
        assert_eq!(c.len(), MAX_CANDIDATES);
    }
}
