// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Per-protocol frame handlers for dsd-neo: M17, YSF, P25 Phase 1/2,
//! DMR, NXDN, D-STAR, and EDACS, plus the dispatch table that routes a
//! detected sync id to its handler.
//!
//! Bit-level demodulation, Viterbi/convolutional decode, and vocoder
//! synthesis live outside this crate; these handlers consume already
//! deframed bits and hand off through [`dsd_neo_core::hooks`] where a
//! protocol needs to touch audio, UDP, or the trunking core.

pub mod dispatch_table;
pub mod dmr;
pub mod dstar;
pub mod edacs;
pub mod m17;
pub mod nxdn;
pub mod p25p1;
pub mod p25p2;
pub mod sync;
pub mod ysf;

pub use dispatch_table::{build_dispatch_table, DispatchOpts, DispatchState};
pub use sync::{M17Sync, SyncId};
