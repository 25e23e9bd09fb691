// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! M17: preamble/LSF/BERT/packet/stream sub-dispatch and Link Setup
//! Frame parsing, including base-40 callsign decode.

use crate::sync::M17Sync;

const CALLSIGN_CHARSET: &[u8] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-/.";

/// A decoded 48-bit M17 address field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressField {
    Callsign(String),
    Broadcast,
    /// Reserved for future use (raw value retained for diagnostics).
    Reserved(u64),
    /// The all-zero address, not a valid target.
    Invalid,
}

/// Decode a 48-bit address, applying the reserved-value guards before
/// attempting base-40 callsign decode.
pub fn decode_address(raw: u64) -> AddressField {
    if raw == 0 {
        return AddressField::Invalid;
    }
    if raw == 0xFFFF_FFFF_FFFF {
        return AddressField::Broadcast;
    }
    if raw >= 0xEE6B_2800_0000 {
        return AddressField::Reserved(raw);
    }

    let mut value = raw;
    let mut chars = [0u8; 9];
    for slot in chars.iter_mut() {
        let idx = (value % 40) as usize;
        *slot = CALLSIGN_CHARSET[idx];
        value /= 40;
    }
    chars.reverse();
    let s = String::from_utf8_lossy(&chars).trim_end().to_string();
    AddressField::Callsign(s)
}

/// Encode a (space-padded, truncated to 9 chars) callsign into its
/// 48-bit base-40 address, the inverse of [`decode_address`] for valid
/// callsigns.
pub fn encode_callsign(callsign: &str) -> u64 {
    let upper = callsign.to_ascii_uppercase();
    let mut padded: Vec<u8> = upper.bytes().take(9).collect();
    while padded.len() < 9 {
        padded.push(b' ');
    }
    let mut value: u64 = 0;
    for &b in &padded {
        let idx = CALLSIGN_CHARSET
            .iter()
            .position(|&c| c == b)
            .unwrap_or(0) as u64;
        value = value * 40 + idx;
    }
    value
}

/// A parsed Link Setup Frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsfFrame {
    pub dst: AddressField,
    pub src: AddressField,
    /// Data type: 1 = data, 2 = voice, 3 = voice + data.
    pub dt: u8,
    /// Encryption type: 0 = none, 1 = scrambler, 2 = AES, 3 = other.
    pub et: u8,
    pub es: u8,
    /// Channel access number.
    pub cn: u8,
    pub rs: bool,
    pub dst_csd: Option<String>,
    pub src_csd: Option<String>,
    pub meta: Option<[u8; 14]>,
}

fn address_callsign(field: &AddressField) -> Option<String> {
    match field {
        AddressField::Callsign(s) => Some(s.clone()),
        _ => None,
    }
}

/// Parse a 28-byte LSF body: 6-byte DST, 6-byte SRC, 2-byte TYPE,
/// 14-byte META. The trailing CRC is verified by the caller before this
/// is invoked.
pub fn parse_lsf(body: &[u8; 28]) -> LsfFrame {
    let dst_raw = u64::from_be_bytes([0, 0, body[0], body[1], body[2], body[3], body[4], body[5]]);
    let src_raw = u64::from_be_bytes([0, 0, body[6], body[7], body[8], body[9], body[10], body[11]]);
    let type_field = u16::from_be_bytes([body[12], body[13]]);

    let dst = decode_address(dst_raw);
    let src = decode_address(src_raw);

    let mut meta = [0u8; 14];
    meta.copy_from_slice(&body[14..28]);
    let meta = if meta.iter().all(|&b| b == 0) { None } else { Some(meta) };

    LsfFrame {
        dst_csd: address_callsign(&dst),
        src_csd: address_callsign(&src),
        dst,
        src,
        dt: ((type_field >> 1) & 0b11) as u8,
        et: ((type_field >> 3) & 0b11) as u8,
        es: ((type_field >> 5) & 0b11) as u8,
        cn: ((type_field >> 7) & 0b1111) as u8,
        rs: type_field & 0x0001 != 0,
        meta,
    }
}

/// What the M17 sub-dispatcher decided to do with a detected frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum M17Outcome {
    PreambleSkipped,
    Lsf(LsfFrame),
    BertMarker,
    Packet(Vec<u8>),
    Stream(Vec<u8>),
}

/// Sub-dispatch on the M17 sync kind, matching the branching the
/// protocol dispatcher performs for M17 frames specifically.
pub fn handle_m17(sync: M17Sync, frame: &[u8]) -> M17Outcome {
    match sync {
        M17Sync::Preamble => M17Outcome::PreambleSkipped,
        M17Sync::Lsf => {
            let mut body = [0u8; 28];
            let n = frame.len().min(28);
            body[..n].copy_from_slice(&frame[..n]);
            M17Outcome::Lsf(parse_lsf(&body))
        }
        M17Sync::Brt => M17Outcome::BertMarker,
        M17Sync::Packet => M17Outcome::Packet(frame.to_vec()),
        M17Sync::Stream => M17Outcome::Stream(frame.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callsign_round_trips_through_encode_decode() {
        for cs in ["W1AW", "N0CALL", "VE3ABC", "K"] {
            let raw = encode_callsign(cs);
            assert_eq!(decode_address(raw), AddressField::Callsign(cs.to_string()));
        }
    }

    #[test]
    fn zero_address_is_invalid() {
        assert_eq!(decode_address(0), AddressField::Invalid);
    }

    #[test]
    fn all_ones_is_broadcast() {
        assert_eq!(decode_address(0xFFFF_FFFF_FFFF), AddressField::Broadcast);
    }

    #[test]
    fn values_at_or_above_reserved_threshold_are_reserved() {
        assert_eq!(decode_address(0xEE6B_2800_0000), AddressField::Reserved(0xEE6B_2800_0000));
        assert_eq!(decode_address(0xEE6B_2800_0001), AddressField::Reserved(0xEE6B_2800_0001));
    }

    #[test]
    fn parse_lsf_extracts_type_subfields() {
        let dst = encode_callsign("W1AW").to_be_bytes();
        let src = encode_callsign("N0CALL").to_be_bytes();
        let mut body = [0u8; 28];
        body[0..6].copy_from_slice(&dst[2..8]);
        body[6..12].copy_from_slice(&src[2..8]);
        // dt=2 (voice), et=0, es=0, cn=3, rs=0
        let type_field: u16 = (2 << 1) | (3 << 7);
        body[12..14].copy_from_slice(&type_field.to_be_bytes());

        let lsf = parse_lsf(&body);
        assert_eq!(lsf.dst_csd.as_deref(), Some("W1AW"));
        assert_eq!(lsf.src_csd.as_deref(), Some("N0CALL"));
        assert_eq!(lsf.dt, 2);
        assert_eq!(lsf.cn, 3);
        assert_eq!(lsf.meta, None);
    }

    #[test]
    fn dispatch_preamble_and_brt_are_markers() {
        assert_eq!(handle_m17(M17Sync::Preamble, &[]), M17Outcome::PreambleSkipped);
        assert_eq!(handle_m17(M17Sync::Brt, &[]), M17Outcome::BertMarker);
    }

    #[test]
    fn dispatch_stream_and_packet_carry_payload() {
        let payload = vec![1u8, 2, 3];
        assert_eq!(
            handle_m17(M17Sync::Packet, &payload),
            M17Outcome::Packet(payload.clone())
        );
        assert_eq!(handle_m17(M17Sync::Stream, &payload), M17Outcome::Stream(payload));
    }
}
