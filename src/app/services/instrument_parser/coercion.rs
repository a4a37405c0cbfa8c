//! Numeric result coercion
//!
//! Rules, applied in order:
//! 1. Sentinel cells (zero prefix, or one of the zero values) coerce to `0.0`
//! 2. Finite numbers coerce to `max(value, 0.0)`
//! 3. Anything else is rejected
//!
//! Instruments that report percent and ppm interchangeably go through
//! [`disambiguate_units`] instead.

use crate::constants::{PERCENT_MARKER, PERCENT_PER_PPM, PPM_MARKER};
use crate::profiles::{CoercionRules, Unit};

/// Applies a profile's coercion rules to raw cells
#[derive(Debug, Clone, Copy)]
pub struct ResultCoercer<'a> {
    rules: &'a CoercionRules,
}

impl<'a> ResultCoercer<'a> {
    pub fn new(rules: &'a CoercionRules) -> Self {
        Self { rules }
    }

    /// True when the cell is a "no result" sentinel
    pub fn is_zero_sentinel(&self, raw: &str) -> bool {
        let prefix = self.rules.zero_prefix.as_str();
        (!prefix.is_empty() && raw.starts_with(prefix))
            || self.rules.zero_values.iter().any(|value| value == raw)
    }

    /// Coerce a raw cell; `None` means the cell is not numeric
    pub fn coerce(&self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if self.is_zero_sentinel(raw) {
            return Some(0.0);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.max(0.0))
    }
}

/// Reading expressed in both concentration units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitReading {
    pub pct: f64,
    pub ppm: f64,
}

impl UnitReading {
    /// Reading in the requested unit
    pub fn primary(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Pct => self.pct,
            Unit::Ppm => self.ppm,
        }
    }
}

/// Why a reading could not be disambiguated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFailure {
    /// No clean signed decimal (with optional exponent) in the reading
    NoNumber,
    /// Neither a ppm nor a percent marker is present
    Undecided,
}

/// Extract a reading and derive both units from its marker
///
/// Negative readings clamp to zero.
pub fn disambiguate_units(raw: &str) -> Result<UnitReading, UnitFailure> {
    let value = number_token(raw)
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or(UnitFailure::NoNumber)?
        .max(0.0);

    if raw.to_lowercase().contains(PPM_MARKER) {
        Ok(UnitReading {
            pct: value * PERCENT_PER_PPM,
            ppm: value,
        })
    } else if raw.contains(PERCENT_MARKER) {
        Ok(UnitReading {
            pct: value,
            ppm: 1.0 / PERCENT_PER_PPM * value,
        })
    } else {
        Err(UnitFailure::Undecided)
    }
}

/// First `[+-]digits[.digits][(e|E)[+-]digits]` run in `raw`
///
/// `None` when there is no such run or it runs straight into another `.`,
/// as in `1.2.3`.
fn number_token(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let skip_digits = |mut i: usize| {
        while digit_at(i) {
            i += 1;
        }
        i
    };

    let start = (0..bytes.len()).find(|&i| match bytes[i] {
        b'0'..=b'9' => true,
        b'.' => digit_at(i + 1),
        b'+' | b'-' => digit_at(i + 1) || (bytes.get(i + 1) == Some(&b'.') && digit_at(i + 2)),
        _ => false,
    })?;

    let mut end = start;
    if matches!(bytes[end], b'+' | b'-') {
        end += 1;
    }
    end = skip_digits(end);
    if bytes.get(end) == Some(&b'.') {
        end = skip_digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        if digit_at(exponent) {
            end = skip_digits(exponent);
        }
    }

    (bytes.get(end) != Some(&b'.')).then(|| &raw[start..end])
}
