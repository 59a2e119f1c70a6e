//! Textual durations.
//!
//! A duration is a sequence of decimal numbers, each with an optional
//! fraction and a unit suffix, such as `300ms`, `1.5h` or `2h45m`. Valid
//! units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m` and `h`. A leading `+`
//! is accepted, and `0` needs no unit.
//!
//! Beyond the unit grammar, a plain integer such as `30` is read as a number
//! of seconds.
//!
//! Values are limited to `i64::MAX` nanoseconds (about 292 years) in either
//! direction. [`parse`] rejects negative durations since
//! [`std::time::Duration`] cannot hold them; [`parse_signed`] accepts them
//! into a [`SignedDuration`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const MAX_NANOS: u64 = i64::MAX as u64;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Reasons a duration fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("invalid duration \"{0}\"")]
    Invalid(String),

    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),

    #[error("unknown unit \"{unit}\" in duration \"{text}\"")]
    UnknownUnit { unit: String, text: String },

    #[error("duration \"{0}\" overflows i64 nanoseconds")]
    Overflow(String),

    #[error("negative duration \"{0}\" is not supported")]
    Negative(String),
}

/// A duration that may be negative, stored as signed nanoseconds.
///
/// Ordered, so it takes `min`/`max` bounds like [`Duration`].
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedDuration(i64);

impl SignedDuration {
    pub const ZERO: Self = Self(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Saturates at the `i64` nanosecond range.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(SECOND as i64))
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Magnitude as an unsigned [`Duration`].
    pub const fn unsigned_abs(self) -> Duration {
        Duration::from_nanos(self.0.unsigned_abs())
    }
}

impl fmt::Debug for SignedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        fmt::Debug::fmt(&self.unsigned_abs(), f)
    }
}

impl From<SignedDuration> for i64 {
    fn from(duration: SignedDuration) -> Self {
        duration.0
    }
}

impl TryFrom<SignedDuration> for Duration {
    type Error = DurationError;

    fn try_from(duration: SignedDuration) -> Result<Self, Self::Error> {
        if duration.is_negative() {
            return Err(DurationError::Negative(format!("{duration:?}")));
        }
        Ok(duration.unsigned_abs())
    }
}

impl FromStr for SignedDuration {
    type Err = DurationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_signed(text)
    }
}

/// Parse a textual duration.
///
/// ```rust
/// use std::time::Duration;
/// use envtag::duration;
///
/// assert_eq!(duration::parse("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(duration::parse("1.5s").unwrap(), Duration::from_millis(1500));
/// assert_eq!(duration::parse("30").unwrap(), Duration::from_secs(30));
/// assert!(duration::parse("5 minutes").is_err());
/// ```
pub fn parse(text: &str) -> Result<Duration, DurationError> {
    let (negative, nanos) = parse_nanos(text)?;
    if negative && nanos > 0 {
        return Err(DurationError::Negative(text.to_string()));
    }
    Ok(Duration::from_nanos(nanos))
}

/// Parse a textual duration that may carry a leading `-`.
///
/// ```rust
/// use envtag::duration::{self, SignedDuration};
///
/// assert_eq!(duration::parse_signed("-1h30m").unwrap(), SignedDuration::from_secs(-5400));
/// assert_eq!(duration::parse_signed("-30").unwrap(), SignedDuration::from_secs(-30));
/// assert_eq!(duration::parse_signed("2s").unwrap(), SignedDuration::from_secs(2));
/// ```
pub fn parse_signed(text: &str) -> Result<SignedDuration, DurationError> {
    let (negative, nanos) = parse_nanos(text)?;
    // `parse_nanos` caps the magnitude at `i64::MAX`.
    let nanos = nanos as i64;
    Ok(SignedDuration(if negative { -nanos } else { nanos }))
}

/// Sign and magnitude in nanoseconds.
fn parse_nanos(text: &str) -> Result<(bool, u64), DurationError> {
    if let Some(seconds) = bare_seconds(text) {
        return seconds;
    }

    let invalid = || DurationError::Invalid(text.to_string());
    let overflow = || DurationError::Overflow(text.to_string());

    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if rest == "0" {
        return Ok((negative, 0));
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, after) = leading_int(rest).ok_or_else(overflow)?;
        let has_whole = after.len() != rest.len();
        rest = after;

        let mut fraction = 0;
        let mut scale = 1.0;
        let mut has_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, digits_scale, after) = leading_fraction(after_dot);
            has_fraction = after.len() != after_dot.len();
            fraction = digits;
            scale = digits_scale;
            rest = after;
        }
        if !has_whole && !has_fraction {
            return Err(invalid());
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after) = rest.split_at(unit_end);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(text.to_string()));
        }
        let unit_nanos = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            text: text.to_string(),
        })?;
        rest = after;

        let mut value = whole
            .checked_mul(unit_nanos)
            .filter(|value| *value <= MAX_NANOS)
            .ok_or_else(overflow)?;
        if fraction > 0 {
            value += (fraction as f64 * (unit_nanos as f64 / scale)) as u64;
            if value > MAX_NANOS {
                return Err(overflow());
            }
        }
        total = total
            .checked_add(value)
            .filter(|total| *total <= MAX_NANOS)
            .ok_or_else(overflow)?;
    }

    Ok((negative, total))
}

/// A canonical integer (no `+`, no leading zeros) counts seconds.
fn bare_seconds(text: &str) -> Option<Result<(bool, u64), DurationError>> {
    let seconds: i64 = text.parse().ok()?;
    if seconds.to_string() != text {
        return None;
    }
    let nanos = seconds
        .unsigned_abs()
        .checked_mul(SECOND)
        .filter(|nanos| *nanos <= MAX_NANOS)
        .map(|nanos| (seconds < 0, nanos))
        .ok_or_else(|| DurationError::Overflow(text.to_string()));
    Some(nanos)
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Consume leading digits. `None` on overflow.
fn leading_int(text: &str) -> Option<(u64, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let mut value: u64 = 0;
    for digit in text[..end].bytes() {
        value = value
            .checked_mul(10)
            .and_then(|value| value.checked_add(u64::from(digit - b'0')))
            .filter(|value| *value <= MAX_NANOS)?;
    }
    Some((value, &text[end..]))
}

/// Consume fraction digits, dropping precision that would overflow.
fn leading_fraction(text: &str) -> (u64, f64, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let mut value: u64 = 0;
    let mut scale = 1.0;
    let mut saturated = false;
    for digit in text[..end].bytes() {
        if saturated {
            continue;
        }
        match value
            .checked_mul(10)
            .and_then(|value| value.checked_add(u64::from(digit - b'0')))
            .filter(|value| *value <= MAX_NANOS)
        {
            Some(next) => {
                value = next;
                scale *= 10.0;
            }
            None => saturated = true,
        }
    }
    (value, scale, &text[end..])
}
