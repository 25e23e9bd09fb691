// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! CSV imports for trunking policy tables: group/TG policy, LCN map,
//! channel map, key tables, and NXDN vertex keys. A failed import
//! leaves the target table untouched and reports an error; nothing is
//! partially applied.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {0}: {1}")]
    Read(String, String),
    #[error("{0}:{1}: {2}")]
    Row(String, usize, String),
}

/// Per-talkgroup handling mode from the group/TG policy CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Normal group call.
    A,
    /// Alternate/backup group call.
    B,
    /// Digital-only group.
    D,
    /// Digital-encrypted group.
    De,
}

impl GroupMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "D" => Some(Self::D),
            "DE" => Some(Self::De),
            _ => None,
        }
    }
}

fn read_rows(path: &Path) -> Result<Vec<String>, ImportError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ImportError::Read(path.display().to_string(), e.to_string()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// `groupNumber, groupMode` rows, `groupMode` in {A, B, D, DE, ...}.
/// Unrecognized modes fail the whole import rather than being silently
/// dropped, per the "leaves target untouched" contract.
pub fn import_group_policy(path: &Path) -> Result<HashMap<u16, GroupMode>, ImportError> {
    let label = path.display().to_string();
    let mut table = HashMap::new();
    for (i, row) in read_rows(path)?.into_iter().enumerate() {
        let mut fields = row.split(',');
        let tg: u16 = fields
            .next()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid groupNumber".into()))?;
        let mode = fields
            .next()
            .and_then(GroupMode::parse)
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid groupMode".into()))?;
        table.insert(tg, mode);
    }
    Ok(table)
}

/// `lcn, freqHz` rows — logical channel number to tuned frequency.
pub fn import_lcn_map(path: &Path) -> Result<HashMap<u16, u64>, ImportError> {
    let label = path.display().to_string();
    let mut table = HashMap::new();
    for (i, row) in read_rows(path)?.into_iter().enumerate() {
        let mut fields = row.split(',');
        let lcn: u16 = fields
            .next()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid lcn".into()))?;
        let freq: u64 = fields
            .next()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid freqHz".into()))?;
        table.insert(lcn, freq);
    }
    Ok(table)
}

/// `channel16, freqHz` rows — a pre-computed override of `resolve_freq`.
pub fn import_channel_map(path: &Path) -> Result<HashMap<u16, u64>, ImportError> {
    import_lcn_map(path)
}

/// A key-table entry, accepting either decimal or `0x`-prefixed hex.
fn parse_key_value(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// `keyId, keyValue` rows, `keyValue` decimal or `0x`-hex.
pub fn import_key_table(path: &Path) -> Result<HashMap<u16, u64>, ImportError> {
    let label = path.display().to_string();
    let mut table = HashMap::new();
    for (i, row) in read_rows(path)?.into_iter().enumerate() {
        let mut fields = row.split(',');
        let key_id: u16 = fields
            .next()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid keyId".into()))?;
        let value = fields
            .next()
            .and_then(parse_key_value)
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid keyValue".into()))?;
        table.insert(key_id, value);
    }
    Ok(table)
}

/// `vertexId, keyValue` rows for NXDN's scrambler vertex keys.
pub fn import_nxdn_vertex_keys(path: &Path) -> Result<HashMap<u8, u64>, ImportError> {
    let label = path.display().to_string();
    let mut table = HashMap::new();
    for (i, row) in read_rows(path)?.into_iter().enumerate() {
        let mut fields = row.split(',');
        let vertex: u8 = fields
            .next()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid vertexId".into()))?;
        let value = fields
            .next()
            .and_then(parse_key_value)
            .ok_or_else(|| ImportError::Row(label.clone(), i, "missing/invalid keyValue".into()))?;
        table.insert(vertex, value);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn group_policy_parses_known_modes() {
        let file = write_temp("1, A\n2,B\n3, D\n4,DE\n# comment\n");
        let table = import_group_policy(file.path()).unwrap();
        assert_eq!(table.get(&1), Some(&GroupMode::A));
        assert_eq!(table.get(&4), Some(&GroupMode::De));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn group_policy_rejects_unknown_mode_and_touches_nothing() {
        let file = write_temp("1,A\n2,ZZZ\n");
        assert!(import_group_policy(file.path()).is_err());
    }

    #[test]
    fn key_table_accepts_decimal_and_hex() {
        let file = write_temp("1,1234\n2,0xABCD\n");
        let table = import_key_table(file.path()).unwrap();
        assert_eq!(table.get(&1), Some(&1234));
        assert_eq!(table.get(&2), Some(&0xABCD));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(import_lcn_map(Path::new("/nonexistent/path.csv")).is_err());
    }
}
