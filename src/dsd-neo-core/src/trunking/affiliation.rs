// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Unit and group affiliation tracking with periodic aging.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// `rid -> last_seen` and `rid -> (tg, last_seen)` tables, aged out on
/// a periodic tick so long-silent units and affiliations drop off.
#[derive(Debug, Default)]
pub struct AffiliationTable {
    units: HashMap<u32, Instant>,
    group_affil: HashMap<u32, (u16, Instant)>,
}

impl AffiliationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_unit(&mut self, rid: u32, now: Instant) {
        self.units.insert(rid, now);
    }

    pub fn note_group_affiliation(&mut self, rid: u32, tg: u16, now: Instant) {
        self.group_affil.insert(rid, (tg, now));
    }

    pub fn is_unit_known(&self, rid: u32) -> bool {
        self.units.contains_key(&rid)
    }

    pub fn group_of(&self, rid: u32) -> Option<u16> {
        self.group_affil.get(&rid).map(|(tg, _)| *tg)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn group_affil_count(&self) -> usize {
        self.group_affil.len()
    }

    /// Drop entries last seen before `now - max_age`.
    pub fn age_out(&mut self, now: Instant, max_age: Duration) {
        self.units.retain(|_, last_seen| {
            now.checked_duration_since(*last_seen)
                .map(|age| age < max_age)
                .unwrap_or(true)
        });
        self.group_affil.retain(|_, (_, last_seen)| {
            now.checked_duration_since(*last_seen)
                .map(|age| age < max_age)
                .unwrap_or(true)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_survive_age_out() {
        let mut table = AffiliationTable::new();
        let now = Instant::now();
        table.note_unit(1, now);
        table.note_group_affiliation(1, 100, now);
        table.age_out(now, Duration::from_secs(60));
        assert!(table.is_unit_known(1));
        assert_eq!(table.group_of(1), Some(100));
    }

    #[test]
    fn stale_entries_are_dropped_on_age_out() {
        let mut table = AffiliationTable::new();
        let t0 = Instant::now();
        table.note_unit(1, t0);
        table.note_group_affiliation(1, 100, t0);
        let later = t0 + Duration::from_secs(120);
        table.age_out(later, Duration::from_secs(60));
        assert!(!table.is_unit_known(1));
        assert_eq!(table.group_of(1), None);
    }

    #[test]
    fn reseen_entry_resets_its_age() {
        let mut table = AffiliationTable::new();
        let t0 = Instant::now();
        table.note_unit(1, t0);
        let t1 = t0 + Duration::from_secs(30);
        table.note_unit(1, t1);
        let t2 = t0 + Duration::from_secs(50);
        table.age_out(t2, Duration::from_secs(40));
        assert!(table.is_unit_known(1));
    }
}
