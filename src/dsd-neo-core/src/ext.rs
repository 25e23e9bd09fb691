// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! State-extension table: a fixed enum of slots, each owning an opaque
//! boxed value, attached to the central trunking state without widening
//! it. Replacing a slot's value drops the previous one; `free_all` drops
//! everything at teardown.

use std::any::Any;

/// The fixed set of subsystems allowed to attach opaque state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtSlot {
    PatchGroups,
    AffiliationCache,
    EventHistory,
    NeighborList,
}

const SLOT_COUNT: usize = 4;

fn slot_index(slot: ExtSlot) -> usize {
    match slot {
        ExtSlot::PatchGroups => 0,
        ExtSlot::AffiliationCache => 1,
        ExtSlot::EventHistory => 2,
        ExtSlot::NeighborList => 3,
    }
}

/// Opaque per-subsystem attachments. Each slot holds at most one boxed
/// value; attaching a new value drops whatever was there before — the
/// teacher pattern this follows calls that a cleanup function, but in
/// Rust the value's own `Drop` impl is the cleanup.
#[derive(Default)]
pub struct ExtensionTable {
    slots: [Option<Box<dyn Any + Send + Sync>>; SLOT_COUNT],
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    /// Attach a value to `slot`, dropping whatever was previously there.
    pub fn attach<T: Any + Send + Sync>(&mut self, slot: ExtSlot, value: T) {
        self.slots[slot_index(slot)] = Some(Box::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self, slot: ExtSlot) -> Option<&T> {
        self.slots[slot_index(slot)]
            .as_ref()
            .and_then(|b| b.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self, slot: ExtSlot) -> Option<&mut T> {
        self.slots[slot_index(slot)]
            .as_mut()
            .and_then(|b| b.downcast_mut::<T>())
    }

    /// Detach and drop a single slot's value.
    pub fn clear(&mut self, slot: ExtSlot) {
        self.slots[slot_index(slot)] = None;
    }

    /// Drop every attached value. Called at teardown.
    pub fn free_all(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_get_round_trips() {
        let mut table = ExtensionTable::new();
        table.attach(ExtSlot::EventHistory, vec![1u32, 2, 3]);
        assert_eq!(
            table.get::<Vec<u32>>(ExtSlot::EventHistory),
            Some(&vec![1, 2, 3])
        );
    }

    #[test]
    fn attaching_again_replaces_previous_value() {
        let mut table = ExtensionTable::new();
        table.attach(ExtSlot::PatchGroups, 1u32);
        table.attach(ExtSlot::PatchGroups, 2u32);
        assert_eq!(table.get::<u32>(ExtSlot::PatchGroups), Some(&2));
    }

    #[test]
    fn wrong_type_downcast_returns_none() {
        let mut table = ExtensionTable::new();
        table.attach(ExtSlot::NeighborList, 1u32);
        assert_eq!(table.get::<String>(ExtSlot::NeighborList), None);
    }

    #[test]
    fn free_all_clears_every_slot() {
        let mut table = ExtensionTable::new();
        table.attach(ExtSlot::PatchGroups, 1u32);
        table.attach(ExtSlot::AffiliationCache, 2u32);
        table.free_all();
        assert_eq!(table.get::<u32>(ExtSlot::PatchGroups), None);
        assert_eq!(table.get::<u32>(ExtSlot::AffiliationCache), None);
    }
}
