//! Parsing of duration strings such as `"10s"`, `"1m30s"` or `"250ms"`.
//!
//! The grammar is a sequence of decimal numbers, each with an optional fraction and a
//! mandatory unit: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
//! Negative values are rejected since every consumer wants a bound or a timeout.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("negative duration ({0})")]
    Negative(String),
    #[error("invalid duration ({0})")]
    Invalid(String),
    #[error("missing unit in duration ({0})")]
    MissingUnit(String),
    #[error("unknown unit ({unit}) in duration ({input})")]
    UnknownUnit { unit: String, input: String },
    #[error("duration ({0}) is out of range")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()))
}

/// Parses `input` into a [`Duration`].
///
/// # Errors
/// Returns a [`DurationError`] describing the first malformed component.
pub fn parse(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(DurationError::Negative(input.to_owned()));
    }
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if body == "0" {
        return Ok(Duration::ZERO);
    }

    let overflow = || DurationError::Overflow(input.to_owned());
    let mut rest = body;
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = tail.strip_prefix('.').map_or(("", tail), split_digits);
        if whole.is_empty() && fraction.is_empty() {
            return Err(DurationError::Invalid(input.to_owned()));
        }

        let unit_end = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_owned()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_owned(),
            input: input.to_owned(),
        })?;

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| overflow())? };
        let mut value = whole.checked_mul(scale).ok_or_else(overflow)?;

        if !fraction.is_empty() {
            // Digits past nanosecond precision cannot change the result.
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| overflow())?;
            let denominator = digits.bytes().fold(1u128, |acc, _| acc * 10);
            value = value.checked_add(numerator * scale / denominator).ok_or_else(overflow)?;
        }

        total = total.checked_add(value).ok_or_else(overflow)?;
        rest = tail;
    }

    let nanos = u64::try_from(total).map_err(|_| overflow())?;
    Ok(Duration::from_nanos(nanos))
}
