// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! IDEN-table-driven channel → frequency resolution with a learned-channel
//! cache that survives IDEN parameter churn.

use std::collections::HashMap;

/// Whether an IDEN entry's carrier is FDMA, TDMA, or not yet known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TdmaFlag {
    #[default]
    Unknown,
    Fdma,
    Tdma,
}

/// Per-frequency-plan parameters broadcast on the control channel for one
/// of the 16 IDEN nibbles.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenEntry {
    /// Base frequency in 5 Hz units.
    pub base_freq_units: u64,
    /// Channel spacing in 125 Hz units.
    pub spacing_125hz: u32,
    pub channel_type: u8,
    pub tdma_flag: TdmaFlag,
    /// Explicit slots-per-carrier when `tdma_flag == Tdma` and known
    /// (must be 1, 2, or 4).
    pub slots_per_carrier: Option<u8>,
    /// 0 = none, 1 = heuristic, 2 = authoritative from an IDEN broadcast.
    pub trust_level: u8,
}

impl IdenEntry {
    fn is_usable(&self) -> bool {
        self.trust_level >= 1 && self.base_freq_units != 0
    }

    fn denom(&self, tdma_system_flag: bool) -> u32 {
        match self.tdma_flag {
            TdmaFlag::Tdma => match self.slots_per_carrier {
                Some(n @ (1 | 2 | 4)) => n as u32,
                _ => 2,
            },
            TdmaFlag::Fdma => 1,
            TdmaFlag::Unknown if tdma_system_flag => 2,
            TdmaFlag::Unknown => 1,
        }
    }
}

/// Channel frequencies already computed once, which keep answering the
/// same way even after the IDEN table that produced them is cleared.
#[derive(Debug, Clone, Default)]
pub struct LearnedChannelMap {
    entries: HashMap<u16, u64>,
}

impl LearnedChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel16: u16) -> Option<u64> {
        self.entries.get(&channel16).copied()
    }

    pub fn insert(&mut self, channel16: u16, freq_hz: u64) {
        self.entries.insert(channel16, freq_hz);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a channel number to a frequency in Hz, consulting the learned
/// map first, then the live IDEN table, storing newly computed results
/// back into the learned map. Returns `None` when unresolved (the caller
/// is expected to raise a rate-limited missing-channel diagnostic).
pub fn resolve_freq(
    channel16: u16,
    iden_params: &[IdenEntry; 16],
    learned_map: &mut LearnedChannelMap,
    tdma_system_flag: bool,
) -> Option<u64> {
    if let Some(freq) = learned_map.get(channel16) {
        return Some(freq);
    }

    let id = (channel16 >> 12) as usize;
    let step = (channel16 & 0x0FFF) as u64;
    let iden = &iden_params[id];

    if !iden.is_usable() {
        return None;
    }

    let denom = iden.denom(tdma_system_flag) as u64;
    let freq_hz = iden.base_freq_units * 5 + (step / denom) * iden.spacing_125hz as u64 * 125;
    learned_map.insert(channel16, freq_hz);
    Some(freq_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fdma_iden1() -> IdenEntry {
        IdenEntry {
            base_freq_units: 851_000_000 / 5,
            spacing_125hz: 100,
            channel_type: 1,
            tdma_flag: TdmaFlag::Fdma,
            slots_per_carrier: None,
            trust_level: 2,
        }
    }

    #[test]
    fn fdma_resolves_base_and_offset_channels() {
        let mut idens = [IdenEntry::default(); 16];
        idens[1] = fdma_iden1();
        let mut learned = LearnedChannelMap::new();

        assert_eq!(resolve_freq(0x1000, &idens, &mut learned, false), Some(851_000_000));
        assert_eq!(resolve_freq(0x100A, &idens, &mut learned, false), Some(851_125_000));
    }

    #[test]
    fn tdma_denom_falls_back_to_two_when_flag_unknown() {
        let mut idens = [IdenEntry::default(); 16];
        idens[1] = IdenEntry {
            tdma_flag: TdmaFlag::Unknown,
            ..fdma_iden1()
        };
        let mut learned = LearnedChannelMap::new();

        assert_eq!(resolve_freq(0x1007, &idens, &mut learned, true), Some(851_037_500));
    }

    #[test]
    fn learned_channel_survives_iden_clear() {
        let mut idens = [IdenEntry::default(); 16];
        idens[1] = fdma_iden1();
        let mut learned = LearnedChannelMap::new();

        assert_eq!(resolve_freq(0x100A, &idens, &mut learned, false), Some(851_125_000));

        idens[1] = IdenEntry::default();
        assert_eq!(resolve_freq(0x100A, &idens, &mut learned, false), Some(851_125_000));
    }

    #[test]
    fn unresolved_channel_returns_none_without_panicking() {
        let idens = [IdenEntry::default(); 16];
        let mut learned = LearnedChannelMap::new();
        assert_eq!(resolve_freq(0x2001, &idens, &mut learned, false), None);
    }

    #[test]
    fn trust_level_zero_is_not_usable_even_with_nonzero_base() {
        let mut idens = [IdenEntry::default(); 16];
        idens[2] = IdenEntry {
            trust_level: 0,
            ..fdma_iden1()
        };
        let mut learned = LearnedChannelMap::new();
        assert_eq!(resolve_freq(0x2000, &idens, &mut learned, false), None);
    }
}
