//! Literal grammars for the types that have no canonical `FromStr` form:
//! booleans, floats, complex numbers, durations and timestamps.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::scalar::{Complex, Duration};

/// Named timestamp layouts, matched case-insensitively, as `chrono` formats.
///
/// `rfc3339` and `rfc3339nano` are not in the table: they, an empty layout and
/// any unknown name are parsed as RFC 3339.
pub const PRESETS: &[(&str, &str)] = &[
    ("layout", "%m/%d %I:%M:%S%p '%y %z"),
    ("ansic", "%a %b %e %H:%M:%S %Y"),
    ("unixdate", "%a %b %e %H:%M:%S %Z %Y"),
    ("rubydate", "%a %b %d %H:%M:%S %z %Y"),
    ("rfc822", "%d %b %y %H:%M %Z"),
    ("rfc822z", "%d %b %y %H:%M %z"),
    ("rfc850", "%A, %d-%b-%y %H:%M:%S %Z"),
    ("rfc1123", "%a, %d %b %Y %H:%M:%S %Z"),
    ("rfc1123z", "%a, %d %b %Y %H:%M:%S %z"),
    ("kitchen", "%I:%M%p"),
    ("stamp", "%b %e %H:%M:%S"),
    ("stampmilli", "%b %e %H:%M:%S%.3f"),
    ("stampmicro", "%b %e %H:%M:%S%.6f"),
    ("stampnano", "%b %e %H:%M:%S%.9f"),
    ("datetime", "%Y-%m-%d %H:%M:%S"),
    ("dateonly", "%Y-%m-%d"),
    ("timeonly", "%H:%M:%S"),
];

/// Parses `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn is_infinity_literal(text: &str) -> bool {
    text.trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf")
}

/// Parses a decimal or exponential `f32`. Finite literals too large for `f32`
/// are rejected.
pub fn parse_f32(text: &str) -> Option<f32> {
    let value = text.parse::<f32>().ok()?;
    if value.is_infinite() && !is_infinity_literal(text) {
        return None;
    }
    Some(value)
}

/// Parses a decimal or exponential `f64`. Finite literals too large for `f64`
/// are rejected.
pub fn parse_f64(text: &str) -> Option<f64> {
    let value = text.parse::<f64>().ok()?;
    if value.is_infinite() && !is_infinity_literal(text) {
        return None;
    }
    Some(value)
}

/// Parses `<real>+<imaginary>i`. Spaces anywhere are ignored.
pub fn parse_complex(text: &str) -> Option<Complex<f64>> {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    let parts: Vec<&str> = compact.split('+').collect();
    let [re, im] = parts.as_slice() else {
        return None;
    };
    let im = im.strip_suffix('i')?;
    Some(Complex::new(parse_f64(re)?, parse_f64(im)?))
}

/// Parses `[-+]?(\d*(\.\d*)?(ns|us|µs|μs|ms|s|m|h))+` or `0`. Magnitudes
/// above `i64::MAX` nanoseconds are rejected.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let (negative, mut rest) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    };

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after) = rest.split_at(int_len);
        rest = after;

        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            (frac_digits, rest) = after_dot.split_at(frac_len);
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return None;
        }
        let (unit, after) = rest.split_at(unit_len);
        rest = after;
        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return None,
        };

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().ok()?
        };
        // digits past nanosecond precision of the largest unit are dropped
        let frac_digits = &frac_digits[..frac_digits.len().min(18)];
        let fraction: u128 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits.parse().ok()?
        };
        let scale = 10u128.pow(frac_digits.len() as u32);

        total = total
            .checked_add(whole.checked_mul(unit_nanos)?)?
            .checked_add(fraction * unit_nanos / scale)?;
        if total > i64::MAX as u128 {
            return None;
        }
    }

    let nanos = i64::try_from(total).ok()?;
    Some(Duration::from_nanos(if negative { -nanos } else { nanos }))
}

enum Layout<'a> {
    Rfc3339,
    Format(&'a str),
}

fn resolve_layout(layout: Option<&str>) -> Layout<'_> {
    let Some(layout) = layout.filter(|layout| !layout.is_empty()) else {
        return Layout::Rfc3339;
    };
    if layout.contains('%') {
        return Layout::Format(layout);
    }

    let name = layout.to_ascii_lowercase();
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, format)| Layout::Format(*format))
        .unwrap_or(Layout::Rfc3339)
}

/// Parses a timestamp. `now` (any case) is the current local time; otherwise
/// `layout` is a preset name, a `chrono` format containing `%`, or absent for
/// RFC 3339.
///
/// Formats without an offset produce UTC, formats without a year produce year
/// 0, and formats without a date produce January 1 of year 0.
pub fn parse_timestamp(text: &str, layout: Option<&str>) -> Option<DateTime<FixedOffset>> {
    if text.eq_ignore_ascii_case("now") {
        return Some(Local::now().fixed_offset());
    }

    match resolve_layout(layout) {
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(text).ok(),
        Layout::Format(format) => parse_with_format(text, format),
    }
}

fn parse_with_format(text: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_str(text, format) {
        return Some(timestamp);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
        return Some(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, format) {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset());
    }
    if let Ok(naive) =
        NaiveDateTime::parse_from_str(&format!("0000 {text}"), &format!("%Y {format}"))
    {
        return Some(naive.and_utc().fixed_offset());
    }

    let time = NaiveTime::parse_from_str(text, format).ok()?;
    let epoch = NaiveDate::from_ymd_opt(0, 1, 1)?;
    Some(epoch.and_time(time).and_utc().fixed_offset())
}
