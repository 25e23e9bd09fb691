// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Shared config loading, logging init, and control-pump plumbing used
//! by every dsd-neo binary.

pub mod config;
pub mod control_pump;
pub mod logging;

pub use config::{ConfigError, ConfigFile, EngineConfig};
pub use control_pump::{ControlPump, PumpAction};
pub use logging::init_logging;
