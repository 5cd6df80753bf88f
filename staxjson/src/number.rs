// SPDX-License-Identifier: Apache-2.0

//! Exact numeric values for JSON.
//!
//! A JSON number is kept in its narrowest lossless form: `i32` when the
//! literal is a short integer, `i64` for longer integers, and otherwise an
//! arbitrary-precision [`Decimal`]. Equality and hashing are value-based
//! across those representations, so `5`, `5.0` and `5E0` all compare equal
//! while each remembers the scale its source text implied.

use crate::error::NumberError;
use num_bigint::{BigInt, Sign};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An arbitrary-precision decimal: `unscaled * 10^(-scale)`.
///
/// A positive scale places digits after the decimal point, a negative one
/// appends zeros. The scale is preserved exactly as the source text
/// implied it, so `1.0` (scale 1) and `1` (scale 0) are distinguishable
/// even though they compare equal.
#[derive(Debug, Clone)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i64,
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        Decimal { unscaled, scale }
    }

    /// The power of ten dividing the unscaled value.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// The unscaled integer value.
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// True when the value carries no fractional digits, meaning the
    /// scale is exactly zero. `2.5E1` is integral (unscaled 25, scale 0)
    /// while `1.0` is not (unscaled 10, scale 1), matching the text the
    /// value came from rather than its mathematical form.
    pub fn is_integral(&self) -> bool {
        self.scale == 0
    }

    /// The mathematically equal form with trailing zeros folded into the
    /// scale. Zero normalizes to scale 0. This is what equality and
    /// hashing compare.
    fn canonical(&self) -> (BigInt, i64) {
        if self.unscaled.sign() == Sign::NoSign {
            return (BigInt::from(0), 0);
        }
        let ten = BigInt::from(10);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        loop {
            let remainder = &unscaled % &ten;
            if remainder.sign() != Sign::NoSign {
                break;
            }
            let Some(next) = scale.checked_sub(1) else {
                break;
            };
            unscaled /= &ten;
            scale = next;
        }
        (unscaled, scale)
    }

    /// Convert to an exact integer, multiplying out a negative scale.
    ///
    /// `max_scale` bounds the magnitude of the stored scale before any
    /// big-integer arithmetic happens, so a hostile exponent cannot force
    /// a huge allocation. The check uses the scale as parsed, not the
    /// canonical one, so `1.000` with a scale past the ceiling is
    /// rejected even though it is mathematically 1.
    pub fn to_bigint_exact(&self, max_scale: u64) -> Result<BigInt, NumberError> {
        if self.scale.unsigned_abs() > max_scale {
            return Err(NumberError::LimitExceeded(format!(
                "decimal scale {} exceeds the configured maximum scale {}",
                self.scale, max_scale
            )));
        }
        let (unscaled, scale) = self.canonical();
        if scale > 0 {
            return Err(NumberError::Arithmetic(format!(
                "decimal value {self} has a nonzero fractional part"
            )));
        }
        if scale == 0 {
            return Ok(unscaled);
        }
        let shift = u32::try_from(scale.unsigned_abs()).map_err(|_| {
            NumberError::Arithmetic(format!("decimal scale {scale} is out of range"))
        })?;
        Ok(unscaled * BigInt::from(10).pow(shift))
    }

    /// Convert to `i64` without loss, or explain why that is impossible.
    pub fn to_i64_exact(&self) -> Result<i64, NumberError> {
        let (unscaled, scale) = self.canonical();
        if scale > 0 {
            return Err(NumberError::Arithmetic(format!(
                "decimal value {self} has a nonzero fractional part"
            )));
        }
        // The smallest magnitude with a canonical shift of n is 10^n, so
        // anything shifted 19 places or more is past the i64 range.
        let shift = scale.unsigned_abs();
        if shift >= 19 {
            return Err(NumberError::Arithmetic(format!(
                "decimal value {self} does not fit in an i64"
            )));
        }
        let value = unscaled * BigInt::from(10).pow(shift as u32);
        i64::try_from(&value).map_err(|_| {
            NumberError::Arithmetic(format!("decimal value {self} does not fit in an i64"))
        })
    }

    /// Convert to `i32` without loss, or explain why that is impossible.
    pub fn to_i32_exact(&self) -> Result<i32, NumberError> {
        let (unscaled, scale) = self.canonical();
        if scale > 0 {
            return Err(NumberError::Arithmetic(format!(
                "decimal value {self} has a nonzero fractional part"
            )));
        }
        let shift = scale.unsigned_abs();
        if shift >= 10 {
            return Err(NumberError::Arithmetic(format!(
                "decimal value {self} does not fit in an i32"
            )));
        }
        let value = unscaled * BigInt::from(10).pow(shift as u32);
        i32::try_from(&value).map_err(|_| {
            NumberError::Arithmetic(format!("decimal value {self} does not fit in an i32"))
        })
    }

    /// Lossy conversion to `f64`, parsing the canonical text form.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse::<f64>().unwrap_or(f64::NAN)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Decimal::new(value, 0)
    }
}

impl FromStr for Decimal {
    type Err = NumberError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_decimal(text)
            .map(|(unscaled, scale)| Decimal::new(unscaled, scale))
            .ok_or_else(|| {
                NumberError::Arithmetic(format!("'{text}' is not a valid decimal literal"))
            })
    }
}

/// Renders the value the way `java.math.BigDecimal` would: plain decimal
/// notation while the scale is non-negative and the adjusted exponent is
/// at least -6, scientific notation (`d.dddE+n`) beyond that. The output
/// length stays proportional to the number of significant digits either
/// way.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled.sign() == Sign::Minus {
            "-"
        } else {
            ""
        };
        let digits = self.unscaled.magnitude().to_string();
        let adjusted = digits.len() as i128 - 1 - self.scale as i128;
        if self.scale >= 0 && adjusted >= -6 {
            if self.scale == 0 {
                return write!(f, "{sign}{digits}");
            }
            let scale = self.scale as usize;
            if digits.len() > scale {
                let point = digits.len() - scale;
                write!(f, "{sign}{}.{}", &digits[..point], &digits[point..])
            } else {
                write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
            }
        } else if digits.len() == 1 {
            write!(f, "{sign}{digits}E{adjusted:+}")
        } else {
            write!(f, "{sign}{}.{}E{adjusted:+}", &digits[..1], &digits[1..])
        }
    }
}

/// A parsed JSON number in its narrowest lossless representation.
///
/// Which variant a literal lands in depends only on its shape: an integer
/// literal of up to 9 digits is an `Int`, up to 18 digits a `Long`, and
/// everything else a `Decimal`. Accessors still succeed across variants
/// whenever the value fits, so `2147483647` (ten digits, stored as a
/// `Long`) converts to `i32` fine.
#[derive(Debug, Clone)]
pub enum JsonNumber {
    Int(i32),
    Long(i64),
    Decimal(Decimal),
}

impl JsonNumber {
    /// Exact `i32` value, if the number has one.
    pub fn as_i32(&self) -> Result<i32, NumberError> {
        match self {
            JsonNumber::Int(v) => Ok(*v),
            JsonNumber::Long(v) => i32::try_from(*v)
                .map_err(|_| NumberError::Arithmetic(format!("{v} does not fit in an i32"))),
            JsonNumber::Decimal(d) => d.to_i32_exact(),
        }
    }

    /// Exact `i64` value, if the number has one.
    pub fn as_i64(&self) -> Result<i64, NumberError> {
        match self {
            JsonNumber::Int(v) => Ok(i64::from(*v)),
            JsonNumber::Long(v) => Ok(*v),
            JsonNumber::Decimal(d) => d.to_i64_exact(),
        }
    }

    /// Lossy `f64` value.
    pub fn as_f64(&self) -> f64 {
        match self {
            JsonNumber::Int(v) => f64::from(*v),
            JsonNumber::Long(v) => *v as f64,
            JsonNumber::Decimal(d) => d.to_f64(),
        }
    }

    /// Widen to the decimal representation.
    pub fn to_decimal(&self) -> Decimal {
        match self {
            JsonNumber::Int(v) => Decimal::from(*v),
            JsonNumber::Long(v) => Decimal::from(*v),
            JsonNumber::Decimal(d) => d.clone(),
        }
    }

    /// Exact integer value, with the scale ceiling applied on the
    /// decimal path.
    pub fn to_bigint_exact(&self, max_scale: u64) -> Result<BigInt, NumberError> {
        match self {
            JsonNumber::Int(v) => Ok(BigInt::from(*v)),
            JsonNumber::Long(v) => Ok(BigInt::from(*v)),
            JsonNumber::Decimal(d) => d.to_bigint_exact(max_scale),
        }
    }

    /// True when the value's scale is zero. Integer variants always are.
    pub fn is_integral(&self) -> bool {
        match self {
            JsonNumber::Int(_) | JsonNumber::Long(_) => true,
            JsonNumber::Decimal(d) => d.is_integral(),
        }
    }
}

/// Classify a validated numeric literal into its narrowest variant.
///
/// `integral` and `digit_count` come from the tokenizer's scan: whether
/// the literal had a fraction or exponent, and how many digits it carried
/// ignoring the sign. The fast paths parse with plain checked integer
/// arithmetic and never touch the big-number machinery.
pub(crate) fn classify(
    literal: &str,
    integral: bool,
    digit_count: usize,
) -> Result<JsonNumber, NumberError> {
    if integral && digit_count <= 18 {
        let value = ascii_to_i64(literal.as_bytes()).ok_or_else(|| {
            NumberError::Arithmetic(format!("'{literal}' is not a valid integer literal"))
        })?;
        if digit_count <= 9 {
            return Ok(JsonNumber::Int(value as i32));
        }
        return Ok(JsonNumber::Long(value));
    }
    literal.parse::<Decimal>().map(JsonNumber::Decimal)
}

/// Checked decimal parse for sign-prefixed ASCII digits.
fn ascii_to_i64(bytes: &[u8]) -> Option<i64> {
    let (negative, digits) = match bytes.split_first()? {
        (b'-', rest) => (true, rest),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value
            .checked_mul(10)?
            .checked_add(i64::from(b - b'0'))?;
    }
    Some(if negative { -value } else { value })
}

fn parse_decimal(text: &str) -> Option<(BigInt, i64)> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len());
    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        digits.push(bytes[pos]);
        pos += 1;
    }
    if pos == int_start {
        return None;
    }

    let mut frac_len: i64 = 0;
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            digits.push(bytes[pos]);
            pos += 1;
        }
        if pos == frac_start {
            return None;
        }
        frac_len = (pos - frac_start) as i64;
    }

    let mut exponent: i64 = 0;
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        let exp_negative = match bytes.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        let exp_start = pos;
        let mut exp_value: i64 = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            exp_value = exp_value
                .checked_mul(10)?
                .checked_add(i64::from(bytes[pos] - b'0'))?;
            pos += 1;
        }
        if pos == exp_start {
            return None;
        }
        exponent = if exp_negative { -exp_value } else { exp_value };
    }

    if pos != bytes.len() {
        return None;
    }

    let scale = frac_len.checked_sub(exponent)?;
    let magnitude = BigInt::parse_bytes(&digits, 10)?;
    let unscaled = if negative { -magnitude } else { magnitude };
    Some((unscaled, scale))
}

impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsonNumber::Int(a), JsonNumber::Int(b)) => a == b,
            (JsonNumber::Long(a), JsonNumber::Long(b)) => a == b,
            (JsonNumber::Int(a), JsonNumber::Long(b)) => i64::from(*a) == *b,
            (JsonNumber::Long(a), JsonNumber::Int(b)) => *a == i64::from(*b),
            _ => self.to_decimal() == other.to_decimal(),
        }
    }
}

impl Eq for JsonNumber {}

/// Hashes via the canonical decimal form so equal values hash alike
/// regardless of variant.
impl Hash for JsonNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_decimal().hash(state);
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonNumber::Int(v) => write!(f, "{v}"),
            JsonNumber::Long(v) => write!(f, "{v}"),
            JsonNumber::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<i32> for JsonNumber {
    fn from(value: i32) -> Self {
        JsonNumber::Int(value)
    }
}

impl From<i64> for JsonNumber {
    fn from(value: i64) -> Self {
        JsonNumber::Long(value)
    }
}

impl From<Decimal> for JsonNumber {
    fn from(value: Decimal) -> Self {
        JsonNumber::Decimal(value)
    }
}
