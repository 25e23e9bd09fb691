// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Core engine plumbing for dsd-neo: ring buffers, hook registry, FEC
//! primitives, channel resolution, the protocol dispatcher, and the P25
//! trunking state machine.
//!
//! DSP, vocoders, UI rendering, and hardware transports are out of scope
//! here — they are reached only through [`hooks::HookRegistry`] or the
//! [`dispatch::DispatchTable`].

pub mod channel;
pub mod diag;
pub mod dispatch;
pub mod error;
pub mod exitflag;
pub mod ext;
pub mod fec;
pub mod freq;
pub mod hooks;
pub mod mac_table;
pub mod ring;
pub mod trunking;

pub use error::CoreError;

/// Convenience alias for CLI-level glue code, mirroring how callers elsewhere
/// in this ecosystem box up heterogeneous error sources at the edges.
pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
