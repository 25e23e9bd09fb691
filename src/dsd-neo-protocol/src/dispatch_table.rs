// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Builds the concrete [`DispatchTable`] wiring each protocol's handler
//! to its sync id. This is the only coupling between the frame-sync
//! layer and the protocol modules.

use std::sync::Arc;

use dsd_neo_core::dispatch::{DispatchEntry, DispatchTable};
use dsd_neo_core::hooks::HookRegistry;
use dsd_neo_core::trunking::TrunkingStateMachine;

use crate::dmr::handle_dmr;
use crate::dstar::handle_dstar;
use crate::edacs::handle_edacs;
use crate::m17::{handle_m17, M17Outcome};
use crate::nxdn::handle_nxdn;
use crate::p25p1::handle_p25_phase1;
use crate::p25p2::handle_p25_phase2;
use crate::sync::{M17Sync, SyncId};
use crate::ysf::handle_ysf;

/// Per-dispatch call context: the hook handle and the current frame's
/// raw bytes, refreshed by the frame-sync layer before each dispatch.
pub struct DispatchOpts {
    pub hooks: Arc<HookRegistry>,
    pub frame: Vec<u8>,
    pub m17_sync: M17Sync,
    pub is_dstar_header_sync: bool,
}

/// Mutable state threaded through dispatch; owns the trunking core for
/// the protocols that feed it events.
pub struct DispatchState {
    pub trunking: TrunkingStateMachine,
    pub last_match: Option<&'static str>,
}

impl DispatchState {
    pub fn new(trunking: TrunkingStateMachine) -> Self {
        Self {
            trunking,
            last_match: None,
        }
    }
}

/// Assemble the ordered dispatch table covering all eight protocols.
pub fn build_dispatch_table() -> DispatchTable<SyncId, DispatchOpts, DispatchState> {
    DispatchTable::builder()
        .push(DispatchEntry::new(
            "m17",
            |s| matches!(s, SyncId::M17(_)),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let outcome = handle_m17(opts.m17_sync, &opts.frame);
                if let M17Outcome::Lsf(lsf) = &outcome {
                    let detail = format!("m17 lsf dst={:?}", lsf.dst_csd);
                    tracing::debug!(protocol = "m17", %detail, "dispatched frame");
                    opts.hooks.p25_event.log_event(&detail);
                }
                state.last_match = Some("m17");
            },
        ))
        .push(DispatchEntry::new(
            "ysf",
            |s| matches!(s, SyncId::Ysf),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_ysf(&opts.frame);
                tracing::trace!(protocol = "ysf", "dispatched frame");
                state.last_match = Some("ysf");
            },
        ))
        .push(DispatchEntry::new(
            "p25p1",
            |s| matches!(s, SyncId::P25Phase1),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_p25_phase1(&opts.frame);
                tracing::trace!(protocol = "p25p1", "dispatched frame");
                state.last_match = Some("p25p1");
            },
        ))
        .push(DispatchEntry::new(
            "p25p2",
            |s| matches!(s, SyncId::P25Phase2),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_p25_phase2(&opts.frame);
                tracing::trace!(protocol = "p25p2", "dispatched frame");
                state.last_match = Some("p25p2");
            },
        ))
        .push(DispatchEntry::new(
            "dmr",
            |s| matches!(s, SyncId::Dmr),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_dmr(&opts.frame);
                tracing::trace!(protocol = "dmr", "dispatched frame");
                state.last_match = Some("dmr");
            },
        ))
        .push(DispatchEntry::new(
            "nxdn",
            |s| matches!(s, SyncId::Nxdn),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_nxdn(&opts.frame);
                tracing::trace!(protocol = "nxdn", "dispatched frame");
                state.last_match = Some("nxdn");
            },
        ))
        .push(DispatchEntry::new(
            "dstar",
            |s| matches!(s, SyncId::DStar),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_dstar(opts.is_dstar_header_sync);
                tracing::trace!(protocol = "dstar", "dispatched frame");
                state.last_match = Some("dstar");
            },
        ))
        .push(DispatchEntry::new(
            "edacs",
            |s| matches!(s, SyncId::Edacs),
            |opts: &mut DispatchOpts, state: &mut DispatchState| {
                let _ = handle_edacs(&opts.frame);
                tracing::trace!(protocol = "edacs", "dispatched frame");
                state.last_match = Some("edacs");
            },
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsd_neo_core::hooks::HookRegistryBuilder;

    fn opts_with_frame(frame: Vec<u8>) -> DispatchOpts {
        DispatchOpts {
            hooks: HookRegistryBuilder::new().build(),
            frame,
            m17_sync: M17Sync::Stream,
            is_dstar_header_sync: false,
        }
    }

    #[test]
    fn first_match_is_routed_to_the_right_handler() {
        let table = build_dispatch_table();
        let mut opts = opts_with_frame(vec![0x01, 0x40, 0, 0]);
        let mut state = DispatchState::new(TrunkingStateMachine::new(HookRegistryBuilder::new().build()));

        let name = table.dispatch(SyncId::P25Phase2, &mut opts, &mut state);
        assert_eq!(name, Some("p25p2"));
        assert_eq!(state.last_match, Some("p25p2"));
    }

    #[test]
    fn unknown_sync_matches_nothing() {
        let table = build_dispatch_table();
        let mut opts = opts_with_frame(vec![]);
        let mut state = DispatchState::new(TrunkingStateMachine::new(HookRegistryBuilder::new().build()));
        assert_eq!(table.dispatch(SyncId::Unknown, &mut opts, &mut state), None);
    }
}
