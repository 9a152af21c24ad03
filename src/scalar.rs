//! Leaf types with a literal grammar that facet has no definition for.

use std::fmt::{self, Display, Write};

use chrono::TimeDelta;
use facet::Facet;

/// A complex number `re + im i`.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    /// Real part.
    pub re: T,
    /// Imaginary part.
    pub im: T,
}

impl<T> Complex<T> {
    /// Builds `re + im i`.
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: Display> Display for Complex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}i", self.re, self.im)
    }
}

/// A signed span of time with nanosecond precision.
///
/// Written in descriptors as `2h30m`, `-1.5s`, `300ms` or `0`.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Duration {
    nanos: i64,
}

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;

impl Duration {
    /// The empty span.
    pub const ZERO: Duration = Duration { nanos: 0 };

    /// A span of `nanos` nanoseconds.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// A span of `micros` microseconds, saturating at the `i64` range.
    pub const fn from_micros(micros: i64) -> Self {
        Self::from_nanos(micros.saturating_mul(NANOS_PER_MICRO))
    }

    /// A span of `millis` milliseconds, saturating at the `i64` range.
    pub const fn from_millis(millis: i64) -> Self {
        Self::from_nanos(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// A span of `secs` seconds, saturating at the `i64` range.
    pub const fn from_secs(secs: i64) -> Self {
        Self::from_nanos(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// A span of `minutes` minutes, saturating at the `i64` range.
    pub const fn from_minutes(minutes: i64) -> Self {
        Self::from_nanos(minutes.saturating_mul(NANOS_PER_MINUTE))
    }

    /// A span of `hours` hours, saturating at the `i64` range.
    pub const fn from_hours(hours: i64) -> Self {
        Self::from_nanos(hours.saturating_mul(NANOS_PER_HOUR))
    }

    /// Length in nanoseconds.
    pub const fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Whether the span points into the past.
    pub const fn is_negative(self) -> bool {
        self.nanos < 0
    }
}

impl From<Duration> for TimeDelta {
    fn from(duration: Duration) -> Self {
        TimeDelta::nanoseconds(duration.nanos)
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = Duration;

    /// Fails, handing the span back, when it is negative.
    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        u64::try_from(duration.nanos)
            .map(std::time::Duration::from_nanos)
            .map_err(|_| duration)
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos < 0 {
            f.write_char('-')?;
        }
        let mut nanos = self.nanos.unsigned_abs();
        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < NANOS_PER_SEC as u64 {
            let (unit, scale) = if nanos < NANOS_PER_MICRO as u64 {
                ("ns", 1)
            } else if nanos < NANOS_PER_MILLI as u64 {
                ("µs", NANOS_PER_MICRO as u64)
            } else {
                ("ms", NANOS_PER_MILLI as u64)
            };
            write_decimal(f, nanos, scale)?;
            return f.write_str(unit);
        }

        let hours = nanos / NANOS_PER_HOUR as u64;
        nanos %= NANOS_PER_HOUR as u64;
        let minutes = nanos / NANOS_PER_MINUTE as u64;
        nanos %= NANOS_PER_MINUTE as u64;
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write_decimal(f, nanos, NANOS_PER_SEC as u64)?;
        f.write_char('s')
    }
}

fn write_decimal(f: &mut fmt::Formatter<'_>, value: u64, scale: u64) -> fmt::Result {
    write!(f, "{}", value / scale)?;
    let fraction = value % scale;
    if fraction == 0 {
        return Ok(());
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{fraction:0width$}");
    write!(f, ".{}", digits.trim_end_matches('0'))
}
