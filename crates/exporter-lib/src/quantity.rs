//! Kubernetes resource quantity parsing and conversion
//!
//! `k8s_openapi` ships quantities as opaque strings; the metric generators
//! need the apimachinery numeric semantics: exact whole-unit conversion for
//! generic metrics and milli-unit scaling for CPU. A quantity is the
//! canonical serial form `<signed number><suffix>` where the suffix is a
//! decimal SI suffix (`n u m k M G T P E`), a binary suffix
//! (`Ki Mi Gi Ti Pi Ei`), or a decimal exponent (`e9`, `E-3`).
//!
//! Values are held as an integer count of nano-units, which covers every
//! quantity the apiserver will admit (precision below nano is rejected,
//! matching the format specification's smallest suffix).

use std::str::FromStr;
use thiserror::Error;

const NANO: i128 = 1_000_000_000;
const MILLI_PER_NANO: i128 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseQuantityError {
    #[error("empty quantity string")]
    Empty,
    #[error("invalid quantity format: {0:?}")]
    Invalid(String),
    #[error("quantity out of representable range: {0:?}")]
    OutOfRange(String),
}

/// A parsed Kubernetes quantity, stored as nano-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity {
    nanos: i128,
}

impl Quantity {
    /// Parse from the canonical string form.
    pub fn parse(s: &str) -> Result<Self, ParseQuantityError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseQuantityError::Empty);
        }

        let invalid = || ParseQuantityError::Invalid(s.to_string());
        let out_of_range = || ParseQuantityError::OutOfRange(s.to_string());

        let (negative, rest) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        // Split the number (digits with at most one decimal point) from the
        // trailing suffix.
        let mut mantissa: i128 = 0;
        let mut digits = 0usize;
        let mut frac_len: Option<usize> = None;
        let mut number_end = rest.len();
        for (i, c) in rest.char_indices() {
            match c {
                '0'..='9' => {
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add((c as u8 - b'0') as i128))
                        .ok_or_else(out_of_range)?;
                    digits += 1;
                    if let Some(f) = frac_len.as_mut() {
                        *f += 1;
                    }
                }
                '.' if frac_len.is_none() => frac_len = Some(0),
                _ => {
                    number_end = i;
                    break;
                }
            }
        }
        if digits == 0 {
            return Err(invalid());
        }
        let frac_len = frac_len.unwrap_or(0);
        let suffix = &rest[number_end..];

        let (pow10, pow1024): (i32, u32) = match suffix {
            "" => (0, 0),
            "n" => (-9, 0),
            "u" => (-6, 0),
            "m" => (-3, 0),
            "k" => (3, 0),
            "M" => (6, 0),
            "G" => (9, 0),
            "T" => (12, 0),
            "P" => (15, 0),
            "E" => (18, 0),
            "Ki" => (0, 1),
            "Mi" => (0, 2),
            "Gi" => (0, 3),
            "Ti" => (0, 4),
            "Pi" => (0, 5),
            "Ei" => (0, 6),
            _ if suffix.starts_with('e') || suffix.starts_with('E') => {
                let exp: i32 = suffix[1..].parse().map_err(|_| invalid())?;
                (exp, 0)
            }
            _ => return Err(invalid()),
        };

        // Scale to nano-units: value = mantissa * 10^(pow10 - frac_len) * 1024^pow1024
        let exp = pow10 - frac_len as i32 + 9;
        let mut nanos = if exp >= 0 {
            let scale = 10i128.checked_pow(exp as u32).ok_or_else(out_of_range)?;
            mantissa.checked_mul(scale).ok_or_else(out_of_range)?
        } else {
            let scale = 10i128.checked_pow(-exp as u32).ok_or_else(out_of_range)?;
            if mantissa % scale != 0 {
                // Finer than nano precision, not representable.
                return Err(out_of_range());
            }
            mantissa / scale
        };
        for _ in 0..pow1024 {
            nanos = nanos.checked_mul(1024).ok_or_else(out_of_range)?;
        }
        if negative {
            nanos = -nanos;
        }

        Ok(Self { nanos })
    }

    /// The value in whole units, if it is exactly representable as an i64.
    pub fn as_int64(&self) -> Option<i64> {
        if self.nanos % NANO != 0 {
            return None;
        }
        i64::try_from(self.nanos / NANO).ok()
    }

    /// The value scaled to milli-units, rounded up. Saturates at the i64
    /// bounds for out-of-range magnitudes.
    pub fn milli_value(&self) -> i64 {
        let q = self.nanos.div_euclid(MILLI_PER_NANO);
        let m = if self.nanos.rem_euclid(MILLI_PER_NANO) != 0 {
            q + 1
        } else {
            q
        };
        m.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl FromStr for Quantity {
    type Err = ParseQuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&k8s_openapi::apimachinery::pkg::api::resource::Quantity> for Quantity {
    type Error = ParseQuantityError;

    fn try_from(
        q: &k8s_openapi::apimachinery::pkg::api::resource::Quantity,
    ) -> Result<Self, Self::Error> {
        Self::parse(&q.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    #[test]
    fn test_parse_plain_integers() {
        assert_eq!(q("2").as_int64(), Some(2));
        assert_eq!(q("0").as_int64(), Some(0));
        assert_eq!(q("-3").as_int64(), Some(-3));
        assert_eq!(q("+7").as_int64(), Some(7));
    }

    #[test]
    fn test_parse_milli_suffix() {
        assert_eq!(q("1500m").milli_value(), 1500);
        assert_eq!(q("1500m").as_int64(), None);
        assert_eq!(q("2000m").as_int64(), Some(2));
        assert_eq!(q("1m").milli_value(), 1);
    }

    #[test]
    fn test_parse_decimal_fraction() {
        assert_eq!(q("1.5").milli_value(), 1500);
        assert_eq!(q("1.5").as_int64(), None);
        assert_eq!(q("0.5").milli_value(), 500);
        assert_eq!(q("2.0").as_int64(), Some(2));
    }

    #[test]
    fn test_parse_binary_suffixes() {
        assert_eq!(q("100Mi").as_int64(), Some(100 * 1024 * 1024));
        assert_eq!(q("1Ki").as_int64(), Some(1024));
        assert_eq!(q("1.5Ki").as_int64(), Some(1536));
        assert_eq!(q("1Ei").as_int64(), Some(1 << 60));
    }

    #[test]
    fn test_parse_decimal_si_suffixes() {
        assert_eq!(q("2k").as_int64(), Some(2000));
        assert_eq!(q("3G").as_int64(), Some(3_000_000_000));
        assert_eq!(q("1E").as_int64(), Some(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_parse_decimal_exponent() {
        assert_eq!(q("3e2").as_int64(), Some(300));
        assert_eq!(q("2E-1").milli_value(), 200);
        assert_eq!(q("12e3").as_int64(), Some(12000));
    }

    #[test]
    fn test_milli_value_rounds_up() {
        // 1n scaled to milli rounds up to 1, as apimachinery does.
        assert_eq!(q("1n").milli_value(), 1);
        assert_eq!(q("1500m").milli_value(), 1500);
        assert_eq!(q("-1500m").milli_value(), -1500);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Quantity::parse(""), Err(ParseQuantityError::Empty));
        assert!(matches!(
            Quantity::parse("abc"),
            Err(ParseQuantityError::Invalid(_))
        ));
        assert!(matches!(
            Quantity::parse("1.2.3"),
            Err(ParseQuantityError::Invalid(_))
        ));
        assert!(matches!(
            Quantity::parse("1Xi"),
            Err(ParseQuantityError::Invalid(_))
        ));
        // Finer than nano precision is not representable.
        assert!(matches!(
            Quantity::parse("0.1n"),
            Err(ParseQuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_try_from_k8s_quantity() {
        let raw = k8s_openapi::apimachinery::pkg::api::resource::Quantity("250m".to_string());
        assert_eq!(Quantity::try_from(&raw).unwrap().milli_value(), 250);
    }
}
