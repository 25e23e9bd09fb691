// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! P25 Phase 2: MAC PDU length lookup on each detected frame's leading
//! opcode byte. Full MAC PDU parsing is out of scope — this is a length
//! query, matching the contract in [`dsd_neo_core::mac_table`].

use dsd_neo_core::mac_table::len_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct P25Phase2Mac {
    pub mfid: u8,
    pub opcode: u8,
    pub trailing_len: u8,
}

/// Read `(mfid, opcode)` from the frame's first two bytes and resolve
/// the MAC PDU's trailing octet count. Returns `None` when the frame is
/// too short to contain an opcode header.
pub fn handle_p25_phase2(frame: &[u8]) -> Option<P25Phase2Mac> {
    let &[mfid, opcode, ..] = frame else {
        return None;
    };
    Some(P25Phase2Mac {
        mfid,
        opcode,
        trailing_len: len_for(mfid, opcode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_standard_opcode() {
        let mac = handle_p25_phase2(&[0x01, 0x40, 0, 0]).unwrap();
        assert_eq!(mac.trailing_len, 9);
    }

    #[test]
    fn short_frame_returns_none() {
        assert_eq!(handle_p25_phase2(&[0x01]), None);
    }
}
