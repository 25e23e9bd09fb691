// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Small forward-error-correction and CRC-mask primitives shared across
//! the protocol dispatch layer.

pub mod crc;
pub mod lsd;

pub use crc::{encode_dmr_lc, encode_masked_crc16, verify_dmr_lc, verify_masked_crc16, MaskedPduKind, DMR_VLC_MASK, DMR_TLC_MASK};
pub use lsd::{decode_lsd, encode_lsd};
