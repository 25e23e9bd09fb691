// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! NXDN: frame-type classification only. The Viterbi/convolutional core
//! is out of scope — it is an external collaborator reached by its own
//! small API, not owned by this crate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NxdnLich {
    Rcch,
    Rtch,
    Rdch,
    Unknown,
}

/// Classify an NXDN frame by its link-information-channel (LICH) type
/// bits, carried in the top two bits of the first byte.
pub fn handle_nxdn(frame: &[u8]) -> NxdnLich {
    match frame.first() {
        Some(&b) => match b >> 6 {
            0b00 => NxdnLich::Rcch,
            0b01 => NxdnLich::Rtch,
            0b10 => NxdnLich::Rdch,
            _ => NxdnLich::Unknown,
        },
        None => NxdnLich::Unknown,
    }
}
