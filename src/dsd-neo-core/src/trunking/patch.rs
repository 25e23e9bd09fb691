// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Patch/regroup (SGID) membership and key-clear override tracking.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// A single super-group: a patch or regroup, with its membership and
/// current key state.
#[derive(Debug, Clone)]
pub struct PatchGroup {
    pub sgid: u16,
    pub is_patch: bool,
    pub active: bool,
    pub key: u32,
    pub alg: u8,
    pub ssn: u8,
    pub wgid_set: HashSet<u16>,
    pub wuid_set: HashSet<u32>,
    pub last_update: Option<Instant>,
}

impl PatchGroup {
    pub fn new(sgid: u16, is_patch: bool) -> Self {
        Self {
            sgid,
            is_patch,
            active: false,
            key: 0,
            alg: 0,
            ssn: 0,
            wgid_set: HashSet::new(),
            wuid_set: HashSet::new(),
            last_update: None,
        }
    }

    /// Whether an active, key-cleared patch overrides ENC lockout for
    /// WGID `wgid` — members of a `key == 0` active super-group are
    /// treated as clear regardless of the per-call ENC bit.
    pub fn overrides_enc_for(&self, wgid: u16) -> bool {
        self.active && self.key == 0 && self.wgid_set.contains(&wgid)
    }
}

/// All known patch/regroup super-groups, keyed by SGID.
#[derive(Debug, Default)]
pub struct PatchGroupTable {
    groups: HashMap<u16, PatchGroup>,
}

impl PatchGroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, sgid: u16, is_patch: bool) -> &mut PatchGroup {
        self.groups
            .entry(sgid)
            .or_insert_with(|| PatchGroup::new(sgid, is_patch))
    }

    pub fn get(&self, sgid: u16) -> Option<&PatchGroup> {
        self.groups.get(&sgid)
    }

    pub fn add_member(&mut self, sgid: u16, wgid: u16, now: Instant) {
        let group = self.groups.entry(sgid).or_insert_with(|| PatchGroup::new(sgid, true));
        group.wgid_set.insert(wgid);
        group.last_update = Some(now);
    }

    pub fn remove_member(&mut self, sgid: u16, wgid: u16) {
        if let Some(group) = self.groups.get_mut(&sgid) {
            group.wgid_set.remove(&wgid);
        }
    }

    pub fn member(&self, sgid: u16, wgid: u16) -> bool {
        self.groups
            .get(&sgid)
            .map(|g| g.wgid_set.contains(&wgid))
            .unwrap_or(false)
    }

    pub fn set_key(&mut self, sgid: u16, key: u32) {
        if let Some(group) = self.groups.get_mut(&sgid) {
            group.key = key;
        }
    }

    /// Whether `wgid` has a key-clear override through ANY active patch
    /// it belongs to.
    pub fn tg_key_is_clear(&self, wgid: u16) -> bool {
        self.groups.values().any(|g| g.overrides_enc_for(wgid))
    }
}
