// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The P25 trunking state machine: voice-channel grant/release, hangtime,
//! mid-call encryption handling, and CC-rotation tick logic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::channel::{resolve_freq, IdenEntry, LearnedChannelMap};
use crate::diag::{DiagKind, DiagLimiter};
use crate::error::CoreError;
use crate::hooks::HookRegistry;

use super::affiliation::AffiliationTable;
use super::candidates::CcCandidates;
use super::patch::PatchGroupTable;

/// Service-bits flag indicating the call carries encrypted traffic.
pub const SVC_BIT_ENC: u8 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SmState {
    OnCc,
    Tuning,
    OnVc,
    HangOnVc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotEncState {
    pub algid: u8,
    pub keyid: u16,
    pub mi: u64,
}

/// Snapshot of SM-owned fields, cheap to deep-copy for UI publication.
#[derive(Debug, Clone, Serialize)]
pub struct P25State {
    pub cc_freq: u64,
    pub vc_freq: [u64; 2],
    pub is_tuned: bool,
    #[serde(skip)]
    pub last_cc_sync: Option<Instant>,
    #[serde(skip)]
    pub last_vc_sync: Option<Instant>,
    pub audio_allowed: [bool; 2],
    pub audio_ring_count: [u32; 2],
    pub force_release: bool,
    pub sm_release_count: u64,
    pub sm_tune_count: u64,
    pub enc: [SlotEncState; 2],
    pub sm_state: SmState,
    #[serde(skip)]
    pub tuning_started_at: Option<Instant>,
}

impl Default for P25State {
    fn default() -> Self {
        Self {
            cc_freq: 0,
            vc_freq: [0, 0],
            is_tuned: false,
            last_cc_sync: None,
            last_vc_sync: None,
            audio_allowed: [false, false],
            audio_ring_count: [0, 0],
            force_release: false,
            sm_release_count: 0,
            sm_tune_count: 0,
            enc: [SlotEncState::default(); 2],
            sm_state: SmState::OnCc,
            tuning_started_at: None,
        }
    }
}

/// Runtime policy gates affecting grant acceptance.
#[derive(Debug, Clone)]
pub struct TrunkingPolicy {
    pub trunk_tune_group_calls: bool,
    pub trunk_tune_private_calls: bool,
    pub trunk_tune_enc_calls: bool,
    pub trunk_use_allow_list: bool,
    pub trunk_hangtime: Duration,
    pub tuning_hold: Duration,
    pub tg_hold: Option<u16>,
    pub block_list: std::collections::HashSet<u16>,
    pub allow_list: std::collections::HashSet<u16>,
}

impl Default for TrunkingPolicy {
    fn default() -> Self {
        Self {
            trunk_tune_group_calls: true,
            trunk_tune_private_calls: true,
            trunk_tune_enc_calls: true,
            trunk_use_allow_list: false,
            trunk_hangtime: Duration::from_secs(3),
            tuning_hold: Duration::from_millis(750),
            tg_hold: None,
            block_list: std::collections::HashSet::new(),
            allow_list: std::collections::HashSet::new(),
        }
    }
}

/// Result of feeding an event into the state machine, mostly useful for
/// tests and for the optional P25 event-history hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmOutcome {
    Tuned { freq_hz: u64 },
    Denied { error: CoreError },
    Unresolved { error: CoreError },
    Deferred,
    Released,
    NoOp,
}

/// The full P25 trunking core: state, policy, candidate/patch/affiliation
/// tables, and the hook handle used to reach tuning/event-log IO.
pub struct TrunkingStateMachine {
    pub state: P25State,
    pub policy: TrunkingPolicy,
    pub iden_params: [IdenEntry; 16],
    pub learned_map: LearnedChannelMap,
    pub candidates: CcCandidates,
    pub patch_groups: PatchGroupTable,
    pub affiliation: AffiliationTable,
    pub tdma_system_flag: bool,
    hooks: Arc<HookRegistry>,
    diag: DiagLimiter,
}

impl TrunkingStateMachine {
    pub fn new(hooks: Arc<HookRegistry>) -> Self {
        Self {
            state: P25State::default(),
            policy: TrunkingPolicy::default(),
            iden_params: [IdenEntry::default(); 16],
            learned_map: LearnedChannelMap::new(),
            candidates: CcCandidates::new(),
            patch_groups: PatchGroupTable::new(),
            affiliation: AffiliationTable::new(),
            tdma_system_flag: false,
            hooks,
            diag: DiagLimiter::default(),
        }
    }

    fn is_blocked(&self, tg: u16) -> bool {
        if self.policy.tg_hold == Some(tg) {
            return false;
        }
        if self.policy.trunk_use_allow_list {
            !self.policy.allow_list.contains(&tg)
        } else {
            self.policy.block_list.contains(&tg)
        }
    }

    fn enc_allowed(&self, tg_or_wgid: u16, svc_bits: u8) -> bool {
        if svc_bits & SVC_BIT_ENC == 0 {
            return true;
        }
        if self.policy.trunk_tune_enc_calls {
            return true;
        }
        self.patch_groups.tg_key_is_clear(tg_or_wgid)
    }

    fn begin_tune(&mut self, freq_hz: u64, now: Instant) {
        self.state.sm_tune_count += 1;
        self.state.vc_freq = [freq_hz, freq_hz];
        self.state.is_tuned = true;
        self.state.last_vc_sync = Some(now);
        self.state.sm_state = SmState::Tuning;
        self.state.tuning_started_at = Some(now);
        self.hooks.trunk_tune.tune_to_freq(freq_hz);
    }

    /// Mark the tuned voice channel as actually synced, completing the
    /// `Tuning -> OnVc` transition.
    pub fn note_vc_sync(&mut self, now: Instant) {
        if self.state.sm_state == SmState::Tuning {
            self.state.sm_state = SmState::OnVc;
        }
        self.state.last_vc_sync = Some(now);
    }

    /// A group voice grant: resolve the channel, apply block-list and
    /// ENC-lockout policy, and tune on success.
    pub fn group_grant(
        &mut self,
        channel16: u16,
        tg: u16,
        _src: u32,
        svc_bits: u8,
        now: Instant,
    ) -> SmOutcome {
        let Some(freq_hz) = resolve_freq(channel16, &self.iden_params, &mut self.learned_map, self.tdma_system_flag) else {
            self.diag.report(DiagKind::MissingChannel, channel16 as u64, "group grant unresolved");
            return SmOutcome::Unresolved { error: CoreError::resolution(channel16) };
        };

        if !self.policy.trunk_tune_group_calls {
            return SmOutcome::Denied { error: CoreError::policy("group-calls-disabled") };
        }
        if self.is_blocked(tg) {
            return SmOutcome::Denied { error: CoreError::policy("block-list") };
        }
        if !self.enc_allowed(tg, svc_bits) {
            self.diag.report(DiagKind::EncLockout, tg as u64, "group grant enc-lockout");
            return SmOutcome::Denied { error: CoreError::policy("enc-lockout") };
        }

        self.begin_tune(freq_hz, now);
        self.state.audio_allowed = [true, true];
        SmOutcome::Tuned { freq_hz }
    }

    /// An individual (private) voice grant: dst/src swapped relative to
    /// a group grant, gated by `trunk_tune_private_calls`.
    pub fn individual_grant(
        &mut self,
        channel16: u16,
        dst: u32,
        _src: u32,
        svc_bits: u8,
        now: Instant,
    ) -> SmOutcome {
        let Some(freq_hz) = resolve_freq(channel16, &self.iden_params, &mut self.learned_map, self.tdma_system_flag) else {
            self.diag.report(DiagKind::MissingChannel, channel16 as u64, "individual grant unresolved");
            return SmOutcome::Unresolved { error: CoreError::resolution(channel16) };
        };

        if !self.policy.trunk_tune_private_calls {
            return SmOutcome::Denied { error: CoreError::policy("private-calls-disabled") };
        }
        if svc_bits & SVC_BIT_ENC != 0 && !self.policy.trunk_tune_enc_calls {
            self.diag.report(DiagKind::EncLockout, dst as u64, "individual grant enc-lockout");
            return SmOutcome::Denied { error: CoreError::policy("enc-lockout") };
        }

        self.begin_tune(freq_hz, now);
        self.state.audio_allowed = [true, true];
        SmOutcome::Tuned { freq_hz }
    }

    fn clear_for_release(&mut self) {
        self.state.audio_allowed = [false, false];
        self.state.audio_ring_count = [0, 0];
        self.state.enc = [SlotEncState::default(); 2];
        self.hooks.p25_event.flush_partial_audio(0);
        self.hooks.p25_event.flush_partial_audio(1);
        self.hooks.trunk_tune.return_to_cc();
        self.state.is_tuned = false;
        self.state.vc_freq = [0, 0];
        self.state.sm_state = SmState::OnCc;
        self.state.tuning_started_at = None;
    }

    /// A release request. `sm_release_count` increments exactly once
    /// regardless of whether the release is taken immediately, deferred
    /// into hangtime, or forced.
    pub fn release(&mut self, now: Instant, reason: &str) -> SmOutcome {
        self.state.sm_release_count += 1;
        self.hooks.frame_sync.sm_release(reason);

        if self.state.force_release {
            self.clear_for_release();
            return SmOutcome::Released;
        }

        if self.state.audio_allowed.iter().any(|&a| a) {
            self.diag.report(DiagKind::DeferredRelease, self.state.vc_freq[0], reason);
            return SmOutcome::Deferred;
        }

        let within_hangtime = self
            .state
            .last_vc_sync
            .map(|last| now.saturating_duration_since(last) < self.policy.trunk_hangtime)
            .unwrap_or(false);

        if within_hangtime {
            self.state.sm_state = SmState::HangOnVc;
            self.diag.report(DiagKind::DeferredRelease, self.state.vc_freq[0], reason);
            return SmOutcome::Deferred;
        }

        self.clear_for_release();
        SmOutcome::Released
    }

    /// Mute one slot's audio due to an encryption transition, flushing
    /// only that slot's ring. If the other slot is idle this triggers a
    /// release under reason "enc-lockout".
    pub fn mid_call_enc_transition(&mut self, slot: usize, now: Instant) -> SmOutcome {
        debug_assert!(slot < 2);
        self.state.audio_allowed[slot] = false;
        self.state.audio_ring_count[slot] = 0;
        self.hooks.p25_event.flush_partial_audio(slot);

        let other = 1 - slot;
        if !self.state.audio_allowed[other] {
            self.diag.report(DiagKind::EncLockout, self.state.enc[slot].keyid as u64, "mid-call enc-lockout");
            return self.release(now, "enc-lockout");
        }
        SmOutcome::NoOp
    }

    /// Insert each neighbor frequency into the CC candidate table,
    /// naturally de-duplicated.
    pub fn neighbor_update(&mut self, freqs: &[u64]) {
        for &f in freqs {
            if f != 0 {
                self.candidates.insert(f);
            }
        }
    }

    /// Advance the CC candidate rotation, skipping cooled entries.
    pub fn next_cc_candidate(&mut self, now: Instant) -> Option<u64> {
        self.candidates.next_candidate(now)
    }

    /// Watchdog tick: force-release a stalled tuning attempt, rotate off
    /// an idle control channel, and age affiliation tables.
    pub fn tick(&mut self, now: Instant) {
        self.hooks.frame_sync.sm_tick();

        if self.state.sm_state == SmState::Tuning {
            let expired = self
                .state
                .tuning_started_at
                .map(|started| now.saturating_duration_since(started) >= self.policy.tuning_hold)
                .unwrap_or(false);
            if expired {
                let error = CoreError::timeout("voice-channel sync");
                tracing::warn!(%error, "tuning hold elapsed without sync");
                self.release(now, "tuning-timeout");
            }
        }

        self.affiliation.age_out(now, Duration::from_secs(900));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::TdmaFlag;
    use crate::hooks::HookRegistryBuilder;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc as StdArc;

    fn fdma_sm() -> TrunkingStateMachine {
        let hooks = HookRegistryBuilder::new().build();
        let mut sm = TrunkingStateMachine::new(hooks);
        sm.iden_params[1] = IdenEntry {
            base_freq_units: 851_000_000 / 5,
            spacing_125hz: 100,
            channel_type: 1,
            tdma_flag: TdmaFlag::Fdma,
            slots_per_carrier: None,
            trust_level: 2,
        };
        sm
    }

    #[test]
    fn enc_override_via_patch_clear_allows_tune() {
        let mut sm = fdma_sm();
        sm.policy.trunk_tune_enc_calls = false;
        let now = Instant::now();
        sm.patch_groups.add_member(69, 0x2345, now);
        sm.patch_groups.get_or_create(69, true).active = true;
        sm.patch_groups.set_key(69, 0);

        let before = sm.state.sm_tune_count;
        let outcome = sm.group_grant(0x100A, 0x2345, 0, SVC_BIT_ENC, now);
        assert!(matches!(outcome, SmOutcome::Tuned { .. }));
        assert_eq!(sm.state.sm_tune_count, before + 1);
    }

    #[test]
    fn enc_without_override_is_denied() {
        let mut sm = fdma_sm();
        sm.policy.trunk_tune_enc_calls = false;
        let now = Instant::now();
        let outcome = sm.group_grant(0x100A, 0x9999, 0, SVC_BIT_ENC, now);
        assert_eq!(outcome, SmOutcome::Denied { error: CoreError::policy("enc-lockout") });
    }

    #[test]
    fn mid_call_enc_flush_isolates_other_slot() {
        let return_calls = StdArc::new(AtomicU32::new(0));
        let return_calls2 = return_calls.clone();
        let hooks = HookRegistryBuilder::new()
            .trunk_return_to_cc(move || {
                return_calls2.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build();
        let mut sm = TrunkingStateMachine::new(hooks);
        sm.state.audio_allowed = [true, true];
        sm.state.audio_ring_count = [2, 3];

        let now = Instant::now();
        let outcome = sm.mid_call_enc_transition(1, now);
        assert_eq!(outcome, SmOutcome::NoOp);
        assert_eq!(sm.state.audio_allowed, [true, false]);
        assert_eq!(sm.state.audio_ring_count, [2, 0]);
        assert_eq!(return_calls.load(Ordering::SeqCst), 0);

        sm.state.audio_allowed[0] = false;
        sm.state.force_release = true;
        let outcome2 = sm.mid_call_enc_transition(1, now);
        assert_eq!(outcome2, SmOutcome::Released);
        assert_eq!(return_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_defers_within_hangtime_then_forces_after() {
        let mut sm = fdma_sm();
        sm.policy.trunk_hangtime = Duration::from_secs(3);
        let now = Instant::now();
        sm.state.last_vc_sync = Some(now);
        sm.state.audio_allowed = [false, false];

        let outcome = sm.release(now, "idle");
        assert_eq!(outcome, SmOutcome::Deferred);
        assert_eq!(sm.state.sm_release_count, 1);

        sm.state.force_release = true;
        let outcome2 = sm.release(now, "forced");
        assert_eq!(outcome2, SmOutcome::Released);
        assert_eq!(sm.state.sm_release_count, 2);
        assert!(!sm.state.is_tuned);
        assert_eq!(sm.state.vc_freq, [0, 0]);
        assert_eq!(sm.state.enc, [SlotEncState::default(); 2]);
    }

    #[test]
    fn blocked_group_is_denied_unless_tg_hold_matches() {
        let mut sm = fdma_sm();
        sm.policy.block_list.insert(0x5000);
        let now = Instant::now();

        let denied = sm.group_grant(0x100A, 0x5000, 0, 0, now);
        assert_eq!(denied, SmOutcome::Denied { error: CoreError::policy("block-list") });

        sm.policy.tg_hold = Some(0x5000);
        let allowed = sm.group_grant(0x100A, 0x5000, 0, 0, now);
        assert!(matches!(allowed, SmOutcome::Tuned { .. }));
    }

    #[test]
    fn unresolved_channel_is_non_fatal() {
        let mut sm = TrunkingStateMachine::new(HookRegistryBuilder::new().build());
        let now = Instant::now();
        assert_eq!(
            sm.group_grant(0x2001, 0x1, 0, 0, now),
            SmOutcome::Unresolved { error: CoreError::resolution(0x2001) }
        );
    }
}
