// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! P25 trunking core: grant/release state machine, CC candidate rotation,
//! patch/regroup membership, affiliation aging, and the watchdog tick.

pub mod affiliation;
pub mod candidates;
pub mod patch;
pub mod state;
pub mod watchdog;

pub use affiliation::AffiliationTable;
pub use candidates::CcCandidates;
pub use patch::{PatchGroup, PatchGroupTable};
pub use state::{P25State, SlotEncState, SmOutcome, SmState, TrunkingPolicy, TrunkingStateMachine, SVC_BIT_ENC};
pub use watchdog::{clamp_cadence_ms, Watchdog, DEFAULT_CADENCE_HEADLESS, DEFAULT_CADENCE_UI};
