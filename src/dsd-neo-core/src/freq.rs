// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Frequency string parsing and the `soapy` input shorthand.

const U32_MAX: u64 = u32::MAX as u64;

/// Parse a frequency string with an optional case-insensitive K/M/G
/// suffix. Invalid or empty input returns 0; overflow clamps to
/// `2^32 - 1`. Returns Hz rounded to the nearest integer.
pub fn parse_freq_hz(input: &str) -> u64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let (number_part, multiplier) = match trimmed.chars().last() {
        Some(c) if c.eq_ignore_ascii_case(&'k') => (&trimmed[..trimmed.len() - 1], 1_000.0),
        Some(c) if c.eq_ignore_ascii_case(&'m') => (&trimmed[..trimmed.len() - 1], 1_000_000.0),
        Some(c) if c.eq_ignore_ascii_case(&'g') => (&trimmed[..trimmed.len() - 1], 1_000_000_000.0),
        _ => (trimmed, 1.0),
    };

    match number_part.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => {
            let hz = (value * multiplier).round();
            if hz >= U32_MAX as f64 {
                U32_MAX
            } else {
                hz as u64
            }
        }
        _ => 0,
    }
}

/// Format a Hz value back into a plain decimal string, suitable as the
/// round-trip partner of [`parse_freq_hz`].
pub fn format_hz(hz: u64) -> String {
    hz.to_string()
}

/// Parsed fields from a `soapy[:args]:freq[:gain[:ppm[:bw[:sql[:vol]]]]]`
/// input-device shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapyShorthand {
    pub audio_in_dev: String,
    pub freq_hz: u64,
    pub gain: Option<f64>,
    pub ppm: Option<f64>,
    pub bandwidth_hz: Option<u64>,
    pub squelch: Option<f64>,
    pub volume: Option<f64>,
}

/// Parse the `soapy` shorthand. Returns `None` when the string doesn't
/// start with `soapy`. Ambiguous trailing fields (any segment that
/// doesn't parse as a number) cause the remainder to be folded back into
/// the device args rather than rejected.
pub fn parse_soapy_shorthand(input: &str) -> Option<SoapyShorthand> {
    let mut parts = input.split(':');
    let head = parts.next()?;
    if !head.eq_ignore_ascii_case("soapy") {
        return None;
    }

    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return None;
    }

    // Walk from the back looking for the longest run of fields that all
    // parse as plain numbers; whatever's left at the front (beyond the
    // "soapy" head) is device args.
    let mut numeric_fields: Vec<f64> = Vec::new();
    let mut split_at = rest.len();
    for (i, field) in rest.iter().enumerate().rev() {
        match field.parse::<f64>() {
            Ok(v) => {
                numeric_fields.push(v);
                split_at = i;
            }
            Err(_) => break,
        }
    }
    numeric_fields.reverse();

    if numeric_fields.is_empty() {
        // No recognizable numeric freq field at all; treat the whole
        // remainder as opaque args with freq 0.
        let args = rest.join(":");
        return Some(SoapyShorthand {
            audio_in_dev: format!("soapy:{args}"),
            freq_hz: 0,
            gain: None,
            ppm: None,
            bandwidth_hz: None,
            squelch: None,
            volume: None,
        });
    }

    let args_fields = &rest[..split_at];
    let audio_in_dev = if args_fields.is_empty() {
        "soapy".to_string()
    } else {
        format!("soapy:{}", args_fields.join(":"))
    };

    let mut it = numeric_fields.into_iter();
    let freq_hz = it.next().map(|v| v.round() as u64).unwrap_or(0);
    Some(SoapyShorthand {
        audio_in_dev,
        freq_hz,
        gain: it.next(),
        ppm: it.next(),
        bandwidth_hz: it.next().map(|v| v.round() as u64),
        squelch: it.next(),
        volume: it.next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_suffixed_values() {
        assert_eq!(parse_freq_hz("851000000"), 851_000_000);
        assert_eq!(parse_freq_hz("851M"), 851_000_000);
        assert_eq!(parse_freq_hz("851.125m"), 851_125_000);
        assert_eq!(parse_freq_hz("1.2G"), 1_200_000_000);
        assert_eq!(parse_freq_hz("5k"), 5_000);
    }

    #[test]
    fn empty_and_invalid_input_returns_zero() {
        assert_eq!(parse_freq_hz(""), 0);
        assert_eq!(parse_freq_hz("   "), 0);
        assert_eq!(parse_freq_hz("not-a-number"), 0);
    }

    #[test]
    fn overflow_clamps_to_u32_max() {
        assert_eq!(parse_freq_hz("9999999999999"), u32::MAX as u64);
    }

    #[test]
    fn round_trip_for_plain_decimal_values() {
        for x in [0u64, 1, 851_000_000, (u32::MAX - 1) as u64] {
            assert_eq!(parse_freq_hz(&format_hz(x)), x);
        }
    }

    #[test]
    fn soapy_shorthand_parses_full_tuning_chain() {
        let parsed = parse_soapy_shorthand("soapy:driver=rtlsdr:851000000:20:0.5:12500:8:0.9").unwrap();
        assert_eq!(parsed.audio_in_dev, "soapy:driver=rtlsdr");
        assert_eq!(parsed.freq_hz, 851_000_000);
        assert_eq!(parsed.gain, Some(20.0));
        assert_eq!(parsed.ppm, Some(0.5));
        assert_eq!(parsed.bandwidth_hz, Some(12500));
        assert_eq!(parsed.squelch, Some(8.0));
        assert_eq!(parsed.volume, Some(0.9));
    }

    #[test]
    fn soapy_shorthand_without_args_defaults_device() {
        let parsed = parse_soapy_shorthand("soapy:851000000").unwrap();
        assert_eq!(parsed.audio_in_dev, "soapy");
        assert_eq!(parsed.freq_hz, 851_000_000);
        assert_eq!(parsed.gain, None);
    }

    #[test]
    fn non_soapy_input_returns_none() {
        assert!(parse_soapy_shorthand("rtl:0").is_none());
    }
}
