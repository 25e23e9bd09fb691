// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The sync-type identifier produced by frame-sync detection (external
//! to this crate) and consumed by the [`crate::dispatch_table`].

/// M17's own sub-sync discrimination, since frame-sync detection tells
/// M17 apart from everything else but not which of its frame kinds was
/// seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M17Sync {
    Preamble,
    Lsf,
    Brt,
    Packet,
    Stream,
}

/// Every sync pattern the frame-sync layer can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncId {
    M17(M17Sync),
    Ysf,
    P25Phase1,
    P25Phase2,
    Dmr,
    Nxdn,
    DStar,
    Edacs,
    Unknown,
}
