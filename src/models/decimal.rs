//! Fixed-point decimal values for NUMERIC(p, s) style columns.
//!
//! Values are kept as integer units at a given scale and stored as canonical
//! text (`"45.50"`), so a store/load round trip never goes through a float.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::validation::ValidationError;

const MAX_SCALE: u32 = 18;

#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    units: i64,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { units: 0, scale: 0 };

    pub const fn new(units: i64, scale: u32) -> Self {
        Self { units, scale }
    }

    pub const fn units(&self) -> i64 {
        self.units
    }

    pub const fn scale(&self) -> u32 {
        self.scale
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDecimal(value.to_string());
        let trimmed = value.trim();

        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (body, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let scale = frac_part.len() as u32;
        if scale > MAX_SCALE {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let magnitude: i64 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| invalid())?
        };

        Ok(Self {
            units: if negative { -magnitude } else { magnitude },
            scale,
        })
    }

    /// `numerator / denominator * 100`, rounded half away from zero to
    /// `decimal_places`. Returns `None` when the denominator is zero.
    pub fn from_ratio_percent(numerator: i64, denominator: i64, decimal_places: u32) -> Option<Self> {
        if denominator == 0 || decimal_places > MAX_SCALE {
            return None;
        }

        let factor = 10i128.pow(decimal_places);
        let scaled = i128::from(numerator) * 100 * factor;
        let denominator = i128::from(denominator);
        let units = div_round_half_away(scaled, denominator);

        i64::try_from(units).ok().map(|units| Self {
            units,
            scale: decimal_places,
        })
    }

    /// Exact change of scale; `None` if digits would be lost or the value overflows.
    pub fn rescale(&self, scale: u32) -> Option<Self> {
        if scale > MAX_SCALE {
            return None;
        }
        if scale >= self.scale {
            let factor = 10i64.checked_pow(scale - self.scale)?;
            let units = self.units.checked_mul(factor)?;
            return Some(Self { units, scale });
        }

        let factor = 10i64.pow(self.scale - scale);
        if self.units % factor != 0 {
            return None;
        }
        Some(Self {
            units: self.units / factor,
            scale,
        })
    }

    /// Rounds half away from zero to `scale` places.
    pub fn round_dp(&self, scale: u32) -> Self {
        if scale >= self.scale {
            return self.rescale(scale).unwrap_or(*self);
        }
        let factor = 10i128.pow(self.scale - scale);
        let units = div_round_half_away(i128::from(self.units), factor);
        Self {
            units: units as i64,
            scale,
        }
    }

    /// Checks the value against a NUMERIC(max_digits, decimal_places) column
    /// and returns it at exactly `decimal_places`.
    pub fn with_precision(
        &self,
        field: &'static str,
        max_digits: u32,
        decimal_places: u32,
    ) -> Result<Self, ValidationError> {
        let precision_error = || ValidationError::Precision {
            field,
            max_digits,
            decimal_places,
            value: self.to_string(),
        };

        let normalized = self.normalized();
        if normalized.scale > decimal_places {
            return Err(precision_error());
        }

        let fixed = normalized.rescale(decimal_places).ok_or_else(precision_error)?;
        let digits = count_digits(fixed.units.unsigned_abs());
        if digits > max_digits {
            return Err(precision_error());
        }
        Ok(fixed)
    }

    pub fn is_negative(&self) -> bool {
        self.units < 0
    }

    fn normalized(&self) -> Self {
        let mut value = *self;
        while value.scale > 0 && value.units % 10 == 0 {
            value.units /= 10;
            value.scale -= 1;
        }
        value
    }

    fn aligned(&self, other: &Self) -> (i128, i128) {
        let scale = self.scale.max(other.scale);
        let left = i128::from(self.units) * 10i128.pow(scale - self.scale);
        let right = i128::from(other.units) * 10i128.pow(scale - other.scale);
        (left, right)
    }
}

fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

fn count_digits(mut value: u64) -> u32 {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let (left, right) = self.aligned(other);
        left == right
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right) = self.aligned(other);
        left.cmp(&right)
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.normalized();
        normalized.units.hash(state);
        normalized.scale.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let magnitude = self.units.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{magnitude}");
        }
        let factor = 10u64.pow(self.scale);
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / factor,
            magnitude % factor,
            width = self.scale as usize
        )
    }
}

impl FromStr for Decimal {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Decimal::parse(value)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or numeric string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Decimal, E> {
        Decimal::parse(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Decimal, E> {
        i64::try_from(value)
            .map(Decimal::from)
            .map_err(|_| E::custom("decimal out of range"))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Decimal, E> {
        if !value.is_finite() {
            return Err(E::custom("decimal must be finite"));
        }
        Decimal::parse(&value.to_string()).map_err(E::custom)
    }
}
