// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The control pump: a nullable callback long-running decoders invoke
//! between frames to drain UI commands without blocking on them.
//! Installed once at bootstrap; default is a no-op so headless builds
//! never pay for it.

/// What the pump told the caller to do after draining pending commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpAction {
    Continue,
    Exit,
}

pub struct ControlPump {
    pump: Option<Box<dyn Fn() -> PumpAction + Send + Sync>>,
}

impl Default for ControlPump {
    fn default() -> Self {
        Self { pump: None }
    }
}

impl ControlPump {
    pub fn new(f: impl Fn() -> PumpAction + Send + Sync + 'static) -> Self {
        Self { pump: Some(Box::new(f)) }
    }

    /// Drain pending UI commands. No-op, returning `Continue`, when
    /// unset.
    pub fn tick(&self) -> PumpAction {
        self.pump.as_ref().map(|f| f()).unwrap_or(PumpAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn unset_pump_always_continues() {
        let pump = ControlPump::default();
        assert_eq!(pump.tick(), PumpAction::Continue);
        assert_eq!(pump.tick(), PumpAction::Continue);
    }

    #[test]
    fn installed_pump_is_invoked_every_tick() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let pump = ControlPump::new(move || {
            calls2.fetch_add(1, Ordering::SeqCst);
            PumpAction::Continue
        });
        pump.tick();
        pump.tick();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn pump_can_request_exit() {
        let pump = ControlPump::new(|| PumpAction::Exit);
        assert_eq!(pump.tick(), PumpAction::Exit);
    }
}
