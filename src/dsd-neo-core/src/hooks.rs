// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Hook registry: thread-safe function-pointer tables installed by the
//! engine, with safe no-op defaults, decoupling protocol/trunking code
//! from IO and UI backends so the core compiles and links headlessly.
//!
//! Each domain is a plain struct of `Option<Box<dyn Fn… + Send + Sync>>`
//! fields. [`HookRegistry`] is built once via [`HookRegistryBuilder`] at
//! startup and shared behind an `Arc` — the `Arc` itself is the
//! publication barrier readers rely on.

use std::sync::Arc;

type BoxedFn<A, R> = Box<dyn Fn(A) -> R + Send + Sync>;
type BoxedFn0<R> = Box<dyn Fn() -> R + Send + Sync>;

/// Telemetry publication: engine state snapshots and UI redraw requests.
#[derive(Default)]
pub struct TelemetryHooks {
    publish: Option<BoxedFn<&'static str, ()>>,
    redraw: Option<BoxedFn0<()>>,
}

impl TelemetryHooks {
    /// Publish a state/opts snapshot. No-op when unset.
    pub fn publish_state(&self, state_json: &'static str) {
        if let Some(f) = &self.publish {
            f(state_json);
        }
    }

    /// Request a UI redraw. No-op when unset.
    pub fn request_redraw(&self) {
        if let Some(f) = &self.redraw {
            f();
        }
    }
}

/// UDP audio blast (digital/analog voice out).
#[derive(Default)]
pub struct UdpAudioHooks {
    digital: Option<Box<dyn Fn(&[u8]) + Send + Sync>>,
    analog: Option<Box<dyn Fn(&[u8]) + Send + Sync>>,
}

impl UdpAudioHooks {
    /// Send digital voice audio. Drops silently when unset.
    pub fn send_digital(&self, payload: &[u8]) {
        if let Some(f) = &self.digital {
            f(payload);
        }
    }

    /// Send analog voice audio. Drops silently when unset.
    pub fn send_analog(&self, payload: &[u8]) {
        if let Some(f) = &self.analog {
            f(payload);
        }
    }
}

/// M17 UDP bind/connect/receive/blast.
#[derive(Default)]
pub struct M17UdpHooks {
    bind: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
    connect: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
    recv: Option<Box<dyn Fn(&mut [u8]) -> i64 + Send + Sync>>,
    blast: Option<Box<dyn Fn(&[u8]) + Send + Sync>>,
}

impl M17UdpHooks {
    pub fn bind(&self, addr: &str) -> bool {
        self.bind.as_ref().map(|f| f(addr)).unwrap_or(false)
    }
    pub fn connect(&self, addr: &str) -> bool {
        self.connect.as_ref().map(|f| f(addr)).unwrap_or(false)
    }
    pub fn recv(&self, buf: &mut [u8]) -> i64 {
        self.recv.as_ref().map(|f| f(buf)).unwrap_or(-1)
    }
    pub fn blast(&self, payload: &[u8]) {
        if let Some(f) = &self.blast {
            f(payload);
        }
    }
}

/// TCP/UDP PCM input: open/close/read/validate.
#[derive(Default)]
pub struct PcmNetInHooks {
    open: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
    close: Option<BoxedFn0<()>>,
    read: Option<Box<dyn Fn(&mut [i16]) -> i64 + Send + Sync>>,
    validate: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl PcmNetInHooks {
    pub fn open(&self, spec: &str) -> bool {
        self.open.as_ref().map(|f| f(spec)).unwrap_or(false)
    }
    pub fn close(&self) {
        if let Some(f) = &self.close {
            f();
        }
    }
    pub fn read(&self, buf: &mut [i16]) -> i64 {
        self.read.as_ref().map(|f| f(buf)).unwrap_or(-1)
    }
    pub fn validate(&self, spec: &str) -> bool {
        self.validate.as_ref().map(|f| f(spec)).unwrap_or(false)
    }
}

/// rigctl frequency query.
#[derive(Default)]
pub struct RigctlHooks {
    current_freq_hz: Option<BoxedFn0<u64>>,
}

impl RigctlHooks {
    /// Current rig frequency in Hz. Returns 0 when unset, per contract.
    pub fn current_freq_hz(&self) -> u64 {
        self.current_freq_hz.as_ref().map(|f| f()).unwrap_or(0)
    }
}

/// RTL-SDR style stream read and power return.
#[derive(Default)]
pub struct RtlStreamHooks {
    read: Option<Box<dyn Fn(&mut [i16]) -> i64 + Send + Sync>>,
    power_db: Option<BoxedFn0<f32>>,
}

impl RtlStreamHooks {
    pub fn read(&self, buf: &mut [i16]) -> i64 {
        self.read.as_ref().map(|f| f(buf)).unwrap_or(-1)
    }
    pub fn power_db(&self) -> f32 {
        self.power_db.as_ref().map(|f| f()).unwrap_or(0.0)
    }
}

/// Trunk tuning: tune-to-freq, tune-to-CC, return-to-CC.
#[derive(Default)]
pub struct TrunkTuneHooks {
    tune_to_freq: Option<Box<dyn Fn(u64) -> bool + Send + Sync>>,
    tune_to_cc: Option<Box<dyn Fn(u64) -> bool + Send + Sync>>,
    return_to_cc: Option<BoxedFn0<bool>>,
}

impl TrunkTuneHooks {
    pub fn tune_to_freq(&self, freq_hz: u64) -> bool {
        self.tune_to_freq
            .as_ref()
            .map(|f| f(freq_hz))
            .unwrap_or(false)
    }
    pub fn tune_to_cc(&self, freq_hz: u64) -> bool {
        self.tune_to_cc
            .as_ref()
            .map(|f| f(freq_hz))
            .unwrap_or(false)
    }
    pub fn return_to_cc(&self) -> bool {
        self.return_to_cc.as_ref().map(|f| f()).unwrap_or(false)
    }
}

/// Optional P25 event-history log and partial-audio flush.
#[derive(Default)]
pub struct P25EventHooks {
    log_event: Option<Box<dyn Fn(&str) + Send + Sync>>,
    flush_partial_audio: Option<Box<dyn Fn(usize) + Send + Sync>>,
}

impl P25EventHooks {
    pub fn log_event(&self, text: &str) {
        if let Some(f) = &self.log_event {
            f(text);
        }
    }
    pub fn flush_partial_audio(&self, slot: usize) {
        if let Some(f) = &self.flush_partial_audio {
            f(slot);
        }
    }
}

/// Frame-sync side effects bridging DSP to the trunking state machine.
#[derive(Default)]
pub struct FrameSyncHooks {
    sm_tick: Option<BoxedFn0<()>>,
    sm_release: Option<Box<dyn Fn(&str) + Send + Sync>>,
    end_of_transmission: Option<Box<dyn Fn(usize) + Send + Sync>>,
}

impl FrameSyncHooks {
    pub fn sm_tick(&self) {
        if let Some(f) = &self.sm_tick {
            f();
        }
    }
    pub fn sm_release(&self, reason: &str) {
        if let Some(f) = &self.sm_release {
            f(reason);
        }
    }
    pub fn end_of_transmission(&self, slot: usize) {
        if let Some(f) = &self.end_of_transmission {
            f(slot);
        }
    }
}

/// The full set of hook domains, installed once by the engine and read
/// from every worker thread thereafter.
#[derive(Default)]
pub struct HookRegistry {
    pub telemetry: TelemetryHooks,
    pub udp_audio: UdpAudioHooks,
    pub m17_udp: M17UdpHooks,
    pub pcm_net_in: PcmNetInHooks,
    pub rigctl: RigctlHooks,
    pub rtl_stream: RtlStreamHooks,
    pub trunk_tune: TrunkTuneHooks,
    pub p25_event: P25EventHooks,
    pub frame_sync: FrameSyncHooks,
}

/// Builder used to install hooks exactly once before any consumer thread
/// starts. Producing an `Arc<HookRegistry>` from the builder is the
/// publication point: every thread that receives a clone of that `Arc`
/// observes a fully-initialized table.
#[derive(Default)]
pub struct HookRegistryBuilder {
    registry: HookRegistry,
}

impl HookRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn telemetry_publish(mut self, f: impl Fn(&'static str) + Send + Sync + 'static) -> Self {
        self.registry.telemetry.publish = Some(Box::new(f));
        self
    }

    pub fn telemetry_redraw(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.registry.telemetry.redraw = Some(Box::new(f));
        self
    }

    pub fn udp_audio_digital(mut self, f: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.registry.udp_audio.digital = Some(Box::new(f));
        self
    }

    pub fn udp_audio_analog(mut self, f: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.registry.udp_audio.analog = Some(Box::new(f));
        self
    }

    pub fn m17_bind(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.registry.m17_udp.bind = Some(Box::new(f));
        self
    }

    pub fn m17_connect(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.registry.m17_udp.connect = Some(Box::new(f));
        self
    }

    pub fn m17_recv(mut self, f: impl Fn(&mut [u8]) -> i64 + Send + Sync + 'static) -> Self {
        self.registry.m17_udp.recv = Some(Box::new(f));
        self
    }

    pub fn m17_blast(mut self, f: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.registry.m17_udp.blast = Some(Box::new(f));
        self
    }

    pub fn pcm_net_open(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.registry.pcm_net_in.open = Some(Box::new(f));
        self
    }

    pub fn pcm_net_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.registry.pcm_net_in.close = Some(Box::new(f));
        self
    }

    pub fn pcm_net_read(mut self, f: impl Fn(&mut [i16]) -> i64 + Send + Sync + 'static) -> Self {
        self.registry.pcm_net_in.read = Some(Box::new(f));
        self
    }

    pub fn pcm_net_validate(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.registry.pcm_net_in.validate = Some(Box::new(f));
        self
    }

    pub fn rigctl_current_freq_hz(mut self, f: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.registry.rigctl.current_freq_hz = Some(Box::new(f));
        self
    }

    pub fn rtl_read(mut self, f: impl Fn(&mut [i16]) -> i64 + Send + Sync + 'static) -> Self {
        self.registry.rtl_stream.read = Some(Box::new(f));
        self
    }

    pub fn rtl_power_db(mut self, f: impl Fn() -> f32 + Send + Sync + 'static) -> Self {
        self.registry.rtl_stream.power_db = Some(Box::new(f));
        self
    }

    pub fn trunk_tune_to_freq(mut self, f: impl Fn(u64) -> bool + Send + Sync + 'static) -> Self {
        self.registry.trunk_tune.tune_to_freq = Some(Box::new(f));
        self
    }

    pub fn trunk_tune_to_cc(mut self, f: impl Fn(u64) -> bool + Send + Sync + 'static) -> Self {
        self.registry.trunk_tune.tune_to_cc = Some(Box::new(f));
        self
    }

    pub fn trunk_return_to_cc(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.registry.trunk_tune.return_to_cc = Some(Box::new(f));
        self
    }

    pub fn p25_log_event(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.registry.p25_event.log_event = Some(Box::new(f));
        self
    }

    pub fn p25_flush_partial_audio(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.registry.p25_event.flush_partial_audio = Some(Box::new(f));
        self
    }

    pub fn frame_sync_tick(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.registry.frame_sync.sm_tick = Some(Box::new(f));
        self
    }

    pub fn frame_sync_release(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.registry.frame_sync.sm_release = Some(Box::new(f));
        self
    }

    pub fn frame_sync_end_of_transmission(
        mut self,
        f: impl Fn(usize) + Send + Sync + 'static,
    ) -> Self {
        self.registry.frame_sync.end_of_transmission = Some(Box::new(f));
        self
    }

    /// Freeze the table into a shared, read-only handle.
    pub fn build(self) -> Arc<HookRegistry> {
        Arc::new(self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc as StdArc;

    #[test]
    fn unset_hooks_are_safe_no_ops() {
        let hooks = HookRegistryBuilder::new().build();
        hooks.telemetry.publish_state("ignored");
        hooks.telemetry.request_redraw();
        hooks.udp_audio.send_digital(b"x");
        assert_eq!(hooks.rigctl.current_freq_hz(), 0);
        assert!(!hooks.trunk_tune.return_to_cc());
        assert_eq!(hooks.rtl_stream.power_db(), 0.0);
    }

    #[test]
    fn installed_hook_is_invoked() {
        let calls = StdArc::new(AtomicU64::new(0));
        let calls2 = calls.clone();
        let hooks = HookRegistryBuilder::new()
            .trunk_return_to_cc(move || {
                calls2.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build();
        assert!(hooks.trunk_tune.return_to_cc());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
