//! Timecode conversion between text, seconds, and milliseconds.
//!
//! The textual form is always `HH:MM:SS.mmm` - two-digit hours, minutes, and
//! seconds with exactly three fractional digits. Downstream caption formats
//! require that exact shape, so the formatter never varies it.
//!
//! All conversions are pure and stateless. Fractions are truncated to the
//! millisecond (never rounded) so independently generated timecodes for the
//! same instant can never drift apart by one millisecond.

/// Parse `HH:MM:SS.mmm` into floating-point seconds.
///
/// Malformed input yields `0.0` rather than an error: a bad timecode in one
/// descriptor must not abort the whole batch. A zero sentinel makes the
/// descriptor fail range validation downstream, where it is logged and
/// skipped.
pub fn parse_seconds(text: &str) -> f64 {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 3 {
        return 0.0;
    }

    let hours: f64 = match parts[0].parse::<u32>() {
        Ok(v) => f64::from(v),
        Err(_) => return 0.0,
    };
    let minutes: f64 = match parts[1].parse::<u32>() {
        Ok(v) => f64::from(v),
        Err(_) => return 0.0,
    };
    let seconds: f64 = match parts[2].parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => return 0.0,
    };

    hours * 3600.0 + minutes * 60.0 + seconds
}

/// Parse `HH:MM:SS.mmm` into integer milliseconds.
///
/// The fractional field is normalized to exactly three digits (shorter
/// fractions are right-padded with zeros, longer ones truncated) so the
/// result always matches what [`format_milliseconds`] would emit for the
/// same instant. Malformed input yields `0`.
pub fn parse_milliseconds(text: &str) -> i64 {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 3 {
        return 0;
    }

    let hours: i64 = match parts[0].parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };
    let minutes: i64 = match parts[1].parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };

    let (sec_str, frac_str) = match parts[2].split_once('.') {
        Some((s, f)) => (s, f),
        None => (parts[2], ""),
    };
    let seconds: i64 = match sec_str.parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };

    let millis = if frac_str.is_empty() {
        0
    } else {
        // Normalize to exactly three digits: "5" -> 500ms, "1234" -> 123ms.
        let mut digits = String::with_capacity(3);
        for c in frac_str.chars().take(3) {
            if !c.is_ascii_digit() {
                return 0;
            }
            digits.push(c);
        }
        while digits.len() < 3 {
            digits.push('0');
        }
        digits.parse::<i64>().unwrap_or(0)
    };

    if hours < 0 || minutes < 0 || seconds < 0 {
        return 0;
    }

    (hours * 3600 + minutes * 60 + seconds) * 1000 + millis
}

/// Format integer milliseconds as `HH:MM:SS.mmm`.
///
/// Lossless for any non-negative millisecond value below 100 hours, which
/// makes the `parse_milliseconds(format_milliseconds(m)) == m` round-trip
/// hold exactly. Negative values clamp to zero.
pub fn format_milliseconds(ms: i64) -> String {
    let ms = ms.max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Format floating-point seconds as `HH:MM:SS.mmm`.
///
/// Truncates to the millisecond; delegates to [`format_milliseconds`] so the
/// two formatters can never disagree about the same instant.
pub fn format_seconds(seconds: f64) -> String {
    format_milliseconds(seconds_to_milliseconds(seconds))
}

/// Convert floating-point seconds to integer milliseconds (truncating).
///
/// Rounds at the microsecond before truncating: a millisecond-precision
/// value that picked up binary float error (1.001 stored as 1.000999...)
/// must land on the same integer as [`parse_milliseconds`] for its textual
/// form.
pub fn seconds_to_milliseconds(seconds: f64) -> i64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    micros / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_handles_standard_form() {
        assert!((parse_seconds("00:00:00.000") - 0.0).abs() < 1e-9);
        assert!((parse_seconds("00:01:23.456") - 83.456).abs() < 1e-9);
        assert!((parse_seconds("01:00:00.000") - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn parse_seconds_returns_sentinel_on_malformed_input() {
        assert_eq!(parse_seconds(""), 0.0);
        assert_eq!(parse_seconds("1:23"), 0.0);
        assert_eq!(parse_seconds("aa:bb:cc"), 0.0);
        assert_eq!(parse_seconds("00:00:-5.0"), 0.0);
    }

    #[test]
    fn format_is_always_twelve_characters() {
        for secs in [0.0, 0.001, 59.999, 61.5, 3599.0, 3600.0, 86399.999] {
            let text = format_seconds(secs);
            assert_eq!(text.len(), 12, "bad width for {}: {}", secs, text);
            let bytes = text.as_bytes();
            assert_eq!(bytes[2], b':');
            assert_eq!(bytes[5], b':');
            assert_eq!(bytes[8], b'.');
        }
    }

    #[test]
    fn milliseconds_round_trip_is_lossless() {
        for ms in [0i64, 1, 999, 1000, 59_999, 60_000, 3_599_999, 3_600_000, 86_399_999] {
            assert_eq!(parse_milliseconds(&format_milliseconds(ms)), ms);
        }
    }

    #[test]
    fn parse_milliseconds_normalizes_short_fractions() {
        // ".5" means half a second, not five milliseconds.
        assert_eq!(parse_milliseconds("00:00:01.5"), 1500);
        assert_eq!(parse_milliseconds("00:00:01.50"), 1500);
        assert_eq!(parse_milliseconds("00:00:01.5001"), 1500);
    }

    #[test]
    fn formatting_truncates_instead_of_rounding() {
        assert_eq!(format_seconds(1.9999), "00:00:01.999");
        assert_eq!(seconds_to_milliseconds(1.9999), 1999);
    }

    #[test]
    fn float_and_integer_paths_agree_at_millisecond_precision() {
        // Odd-millisecond values are the ones binary floats cannot represent
        // exactly; both conversion paths must still land on the same integer.
        let mut samples: Vec<i64> = (0..10_000).collect();
        samples.extend([
            59_999, 60_001, 61_003, 599_997, 3_599_999, 3_600_001, 86_399_999,
        ]);
        for ms in samples {
            let text = format_milliseconds(ms);
            assert_eq!(
                seconds_to_milliseconds(parse_seconds(&text)),
                parse_milliseconds(&text),
                "paths disagree for {}",
                text
            );
        }
    }

    #[test]
    fn negative_and_nonfinite_values_clamp_to_zero() {
        assert_eq!(format_seconds(-3.0), "00:00:00.000");
        assert_eq!(format_seconds(f64::NAN), "00:00:00.000");
        assert_eq!(format_milliseconds(-10), "00:00:00.000");
    }
}
