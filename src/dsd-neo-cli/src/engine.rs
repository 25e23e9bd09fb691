// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Engine bootstrap: spawns the SDR, demod, audio, and watchdog threads
//! described by the concurrency model, and tears them down in reverse
//! start order on shutdown.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use dsd_neo_app::EngineConfig;
use dsd_neo_core::exitflag::ExitFlag;
use dsd_neo_core::hooks::HookRegistry;
use dsd_neo_core::ring::{IqRing, PcmRing, SignalMode, READ_EXIT};
use dsd_neo_core::trunking::{TrunkingStateMachine, Watchdog};
use dsd_neo_core::CoreError;
use tracing::{debug, info, warn};

const IQ_RING_CAPACITY: usize = 1 << 16;
const PCM_RING_CAPACITY: usize = 1 << 14;
const PCM_SAMPLE_RATE_HZ: u32 = 8_000;
const IQ_READ_BLOCK: usize = 4096;

/// What the engine decided after a run completes, mirroring the
/// bootstrap/CLI exit-code contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Continue,
    Exit(i32),
    Error,
}

/// Owns the shared rings, hook table, and trunking core, and the thread
/// handles spawned against them.
pub struct Engine {
    exitflag: ExitFlag,
    hooks: Arc<HookRegistry>,
    iq_ring: Arc<IqRing>,
    pcm_ring: Arc<PcmRing>,
    sm: Arc<Mutex<TrunkingStateMachine>>,
    watchdog: Arc<Watchdog>,
    headless: bool,
}

impl Engine {
    pub fn new(config: &EngineConfig, hooks: Arc<HookRegistry>, headless: bool) -> Self {
        let exitflag = ExitFlag::new();
        let sm = Arc::new(Mutex::new(TrunkingStateMachine::new(hooks.clone())));
        {
            let mut guard = sm.lock().expect("trunking state machine lock poisoned");
            guard.policy.trunk_tune_group_calls = config.trunk_tune_group_calls;
            guard.policy.trunk_tune_private_calls = config.trunk_tune_private_calls;
            guard.policy.trunk_tune_enc_calls = config.trunk_tune_enc_calls;
            guard.policy.trunk_use_allow_list = config.trunk_use_allow_list;
            guard.policy.trunk_hangtime = std::time::Duration::from_secs(config.trunk_hangtime_secs);
        }
        let cadence = dsd_neo_core::trunking::clamp_cadence_ms(config.watchdog_cadence_ms(headless));
        let watchdog = Arc::new(Watchdog::new(cadence, exitflag.clone()));

        Self {
            iq_ring: Arc::new(IqRing::new(IQ_RING_CAPACITY, exitflag.clone())),
            pcm_ring: Arc::new(PcmRing::new(PCM_RING_CAPACITY, PCM_SAMPLE_RATE_HZ, exitflag.clone())),
            sm,
            watchdog,
            exitflag,
            hooks,
            headless,
        }
    }

    pub fn exitflag(&self) -> ExitFlag {
        self.exitflag.clone()
    }

    /// Spawn every worker thread and block until shutdown is observed,
    /// joining threads in the reverse of start order.
    pub fn run(&self) -> ExitCode {
        info!(headless = self.headless, "engine starting");

        let watchdog_handle = self.watchdog.clone().spawn(self.sm.clone());
        let audio_handle = self.spawn_audio_thread();
        let demod_handle = self.spawn_demod_thread();
        let sdr_handle = self.spawn_sdr_thread();

        // The SDR thread is the only one expected to return on its own
        // (device loss, EOF on a file source); once it does, signal the
        // rest and join in reverse of start order per the shutdown
        // contract.
        let _ = sdr_handle.join();
        self.exitflag.signal();
        let _ = demod_handle.join();
        let _ = audio_handle.join();
        let _ = watchdog_handle.join();

        self.hooks.trunk_tune.return_to_cc();
        info!("engine stopped");
        ExitCode::Continue
    }

    fn spawn_sdr_thread(&self) -> JoinHandle<()> {
        let exitflag = self.exitflag.clone();
        let iq_ring = self.iq_ring.clone();
        let hooks = self.hooks.clone();
        thread::spawn(move || {
            let mut buf = [0i16; IQ_READ_BLOCK];
            while !exitflag.is_set() {
                let n = hooks.rtl_stream.read(&mut buf);
                if n < 0 {
                    let error = CoreError::transport(format!("rtl stream read returned {n}"));
                    if error.is_transient() {
                        warn!(%error, "retrying after transport error");
                        thread::sleep(std::time::Duration::from_millis(50));
                        continue;
                    }
                    break;
                }
                if n == 0 {
                    continue;
                }
                iq_ring.write(&buf[..n as usize], SignalMode::OnEmptyTransition);
            }
        })
    }

    fn spawn_demod_thread(&self) -> JoinHandle<()> {
        let exitflag = self.exitflag.clone();
        let iq_ring = self.iq_ring.clone();
        let pcm_ring = self.pcm_ring.clone();
        let hooks = self.hooks.clone();
        let sm = self.sm.clone();
        thread::spawn(move || {
            let mut iq_buf = [0i16; IQ_READ_BLOCK];
            let silence = [0i16; 160];
            loop {
                let n = iq_ring.read_block(&mut iq_buf);
                if n == READ_EXIT {
                    debug!(error = %CoreError::Shutdown, "demod thread observed exit flag");
                    break;
                }
                if n == 0 {
                    continue;
                }
                // Frame-sync and demodulation are out of scope here; they
                // feed the protocol dispatch table (dsd-neo-protocol) and
                // the trunking core through the hook registry. This loop
                // only demonstrates the thread's place in the pipeline:
                // drain IQ, let the SM observe liveness, produce PCM.
                hooks.frame_sync.sm_tick();
                pcm_ring.write(&silence, SignalMode::OnEmptyTransition);
                if exitflag.is_set() {
                    break;
                }
            }
            let mut guard = sm.lock().expect("trunking state machine lock poisoned");
            guard.tick(Instant::now());
        })
    }

    /// Drain PCM and hand it to the audio sink hook. Audio backends
    /// themselves are out of scope; this thread only owns the
    /// read-and-forward loop.
    fn spawn_audio_thread(&self) -> JoinHandle<()> {
        let pcm_ring = self.pcm_ring.clone();
        let hooks = self.hooks.clone();
        thread::spawn(move || {
            let mut buf = [0i16; 160];
            loop {
                let n = pcm_ring.read_block(&mut buf);
                if n == READ_EXIT {
                    debug!(error = %CoreError::Shutdown, "audio thread observed exit flag");
                    break;
                }
                if n == 0 {
                    continue;
                }
                let bytes: Vec<u8> = buf[..n as usize].iter().flat_map(|s| s.to_le_bytes()).collect();
                hooks.udp_audio.send_digital(&bytes);
            }
        })
    }
}
