//! Native and issued currency amounts

use crate::address::AccountId;
use localops_errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Largest native amount in drops (10^17)
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;

const MIN_MANTISSA: u64 = 1_000_000_000_000_000;
const MAX_MANTISSA: u64 = 9_999_999_999_999_999;
const MIN_EXPONENT: i32 = -96;
const MAX_EXPONENT: i32 = 80;
const MAX_SIGNIFICANT_DIGITS: usize = 16;

const ISSUED_BIT: u64 = 1 << 63;
const POSITIVE_BIT: u64 = 1 << 62;
const MANTISSA_MASK: u64 = (1 << 54) - 1;
const EXPONENT_BIAS: i32 = 97;

/// Amount of either the native currency (in drops) or an issued currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Native(u64),
    Issued(IssuedAmount),
}

impl Amount {
    /// Native amount, rejecting values above [`MAX_DROPS`]
    pub fn native(drops: u64) -> Result<Self> {
        if drops > MAX_DROPS {
            return Err(Error::encoding(format!("native amount {drops} exceeds maximum")));
        }
        Ok(Amount::Native(drops))
    }

    pub fn issued(value: &str, currency: &str, issuer: &str) -> Result<Self> {
        Ok(Amount::Issued(IssuedAmount {
            value: value.parse()?,
            currency: currency.parse()?,
            issuer: issuer.parse()?,
        }))
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Native(_))
    }
}

/// Issued currency amount: value, currency and issuing account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAmount {
    pub value: IssuedValue,
    pub currency: Currency,
    pub issuer: AccountId,
}

/// Normalised decimal value of an issued amount
///
/// A non-zero value keeps its mantissa in `[10^15, 10^16)` and its exponent
/// in `[-96, 80]`. Zero is stored as mantissa 0, exponent 0, positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedValue {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

impl IssuedValue {
    pub const ZERO: IssuedValue = IssuedValue {
        negative: false,
        mantissa: 0,
        exponent: 0,
    };

    /// Build a normalised value from `(-1)^negative * mantissa * 10^exponent`
    pub fn new(negative: bool, mut mantissa: u64, mut exponent: i32) -> Result<Self> {
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }

        while mantissa < MIN_MANTISSA {
            mantissa *= 10;
            exponent = exponent.saturating_sub(1);
        }
        while mantissa > MAX_MANTISSA {
            if mantissa % 10 != 0 {
                return Err(Error::encoding("issued amount has too many significant digits"));
            }
            mantissa /= 10;
            exponent = exponent.saturating_add(1);
        }

        if exponent < MIN_EXPONENT {
            return Ok(Self::ZERO);
        }
        if exponent > MAX_EXPONENT {
            return Err(Error::encoding(format!(
                "issued amount exponent {exponent} out of range"
            )));
        }

        Ok(Self {
            negative,
            mantissa,
            exponent,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// The 64-bit wire form, including the issued-currency bit
    pub fn to_bits(&self) -> u64 {
        if self.is_zero() {
            return ISSUED_BIT;
        }
        let mut bits = ISSUED_BIT | self.mantissa;
        if !self.negative {
            bits |= POSITIVE_BIT;
        }
        bits | (((self.exponent + EXPONENT_BIAS) as u64) << 54)
    }

    pub fn from_bits(bits: u64) -> Result<Self> {
        if bits & ISSUED_BIT == 0 {
            return Err(Error::encoding("value is not an issued amount"));
        }
        let mantissa = bits & MANTISSA_MASK;
        if mantissa == 0 {
            if bits != ISSUED_BIT {
                return Err(Error::encoding("issued zero carries sign or exponent bits"));
            }
            return Ok(Self::ZERO);
        }
        let exponent = ((bits >> 54) & 0xFF) as i32 - EXPONENT_BIAS;
        let value = Self::new(bits & POSITIVE_BIT == 0, mantissa, exponent)?;
        if value.mantissa != mantissa {
            return Err(Error::encoding("issued amount is not normalised"));
        }
        Ok(value)
    }
}

impl FromStr for IssuedValue {
    type Err = Error;

    /// Parse a decimal string such as `-1.25`, `100` or `1.5e-3`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::encoding(format!("invalid issued amount value: {s}"));

        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (number, exp_part) = match unsigned.find(['e', 'E']) {
            Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
            None => (unsigned, None),
        };
        let mut exponent: i32 = match exp_part {
            Some(e) => e.parse().map_err(|_| invalid())?,
            None => 0,
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let frac_len = i32::try_from(frac_part.len()).map_err(|_| invalid())?;
        exponent = exponent.saturating_sub(frac_len);
        let digits: String = format!("{int_part}{frac_part}");
        let digits = digits.trim_start_matches('0');
        let significant = digits.trim_end_matches('0');
        if significant.is_empty() {
            return Ok(Self::ZERO);
        }
        if significant.len() > MAX_SIGNIFICANT_DIGITS {
            return Err(Error::encoding(format!(
                "issued amount {s} has more than {MAX_SIGNIFICANT_DIGITS} significant digits"
            )));
        }

        let trailing = i32::try_from(digits.len() - significant.len()).map_err(|_| invalid())?;
        exponent = exponent.saturating_add(trailing);

        let mantissa: u64 = significant.parse().map_err(|_| invalid())?;
        Self::new(negative, mantissa, exponent)
    }
}

impl fmt::Display for IssuedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut mantissa = self.mantissa;
        let mut exponent = self.exponent;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }
        let digits = mantissa.to_string();
        let sign = if self.negative { "-" } else { "" };

        if exponent >= 0 {
            if exponent > 10 {
                return write!(f, "{sign}{digits}e{exponent}");
            }
            return write!(f, "{sign}{digits}{}", "0".repeat(exponent as usize));
        }

        let shift = (-exponent) as usize;
        if shift >= digits.len() {
            let leading = shift - digits.len();
            if leading > 20 {
                return write!(f, "{sign}{digits}e{exponent}");
            }
            write!(f, "{sign}0.{}{digits}", "0".repeat(leading))
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - shift);
            write!(f, "{sign}{int_part}.{frac_part}")
        }
    }
}

/// 160-bit currency code
///
/// Three-character codes occupy bytes 12..15; any other code is 20 raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; 20]);

impl Currency {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| Error::encoding("currency must be 20 bytes"))?;
        Ok(Self(bytes))
    }

    /// Three-character code, if the bytes are in the standard layout
    pub fn iso_code(&self) -> Option<&str> {
        let (head, rest) = self.0.split_at(12);
        let (code, tail) = rest.split_at(3);
        if head.iter().any(|b| *b != 0) || tail.iter().any(|b| *b != 0) {
            return None;
        }
        let code = std::str::from_utf8(code).ok()?;
        if code.chars().all(is_iso_char) && code != "XRP" {
            Some(code)
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

fn is_iso_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "?!@#$%^&*<>(){}[]|".contains(c)
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() == 3 {
            if s == "XRP" || !s.chars().all(is_iso_char) {
                return Err(Error::encoding(format!("invalid currency code: {s}")));
            }
            let mut bytes = [0u8; 20];
            bytes[12..15].copy_from_slice(s.as_bytes());
            return Ok(Self(bytes));
        }
        if s.len() == 40 {
            let raw = hex::decode(s).map_err(|e| Error::encoding(format!("invalid currency: {e}")))?;
            return Self::from_slice(&raw);
        }
        Err(Error::encoding(format!("invalid currency code: {s}")))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iso_code() {
            Some(code) => f.write_str(code),
            None => f.write_str(&hex::encode_upper(self.0)),
        }
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_bounds() {
        assert!(Amount::native(MAX_DROPS).is_ok());
        assert!(Amount::native(MAX_DROPS + 1).is_err());
    }

    #[test]
    fn test_parse_and_normalise() {
        let v: IssuedValue = "1".parse().unwrap();
        assert_eq!(v.mantissa(), 1_000_000_000_000_000);
        assert_eq!(v.exponent(), -15);

        let v: IssuedValue = "-0.0025".parse().unwrap();
        assert!(v.is_negative());
        assert_eq!(v.mantissa(), 2_500_000_000_000_000);
        assert_eq!(v.exponent(), -18);

        let v: IssuedValue = "1.5e3".parse().unwrap();
        assert_eq!(v.to_string(), "1500");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<IssuedValue>().is_err());
        assert!("1.2.3".parse::<IssuedValue>().is_err());
        assert!("".parse::<IssuedValue>().is_err());
        assert!("12345678901234567".parse::<IssuedValue>().is_err());
        assert!("1e200".parse::<IssuedValue>().is_err());
    }

    #[test]
    fn test_extreme_exponents() {
        assert!(matches!(
            "10e2147483647".parse::<IssuedValue>(),
            Err(Error::EncodingError(_))
        ));
        assert!("1e-2147483648".parse::<IssuedValue>().unwrap().is_zero());
        assert!(IssuedValue::new(false, 1, i32::MIN).unwrap().is_zero());
        assert!(IssuedValue::new(true, MAX_MANTISSA * 10, i32::MAX).is_err());
    }

    #[test]
    fn test_zero_bits_must_be_canonical() {
        assert!(IssuedValue::from_bits(ISSUED_BIT).unwrap().is_zero());
        assert!(IssuedValue::from_bits(ISSUED_BIT | POSITIVE_BIT).is_err());
        assert!(IssuedValue::from_bits(ISSUED_BIT | (1 << 54)).is_err());
    }

    #[test]
    fn test_zero() {
        let zero: IssuedValue = "0.000".parse().unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.to_bits(), 0x8000_0000_0000_0000);
        assert_eq!(zero.to_string(), "0");
    }

    #[test]
    fn test_bits_known_value() {
        // 1 USD: mantissa 10^15, exponent -15
        let one: IssuedValue = "1".parse().unwrap();
        assert_eq!(one.to_bits(), 0xD4838D7EA4C68000);
        assert_eq!(IssuedValue::from_bits(0xD4838D7EA4C68000).unwrap(), one);
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["123.456", "-7", "0.0001", "42000000", "9999999999999999e70"] {
            let v: IssuedValue = s.parse().unwrap();
            let back: IssuedValue = v.to_string().parse().unwrap();
            assert_eq!(v, back, "{s}");
        }
    }

    #[test]
    fn test_currency_codes() {
        let usd: Currency = "USD".parse().unwrap();
        assert_eq!(usd.to_string(), "USD");
        assert_eq!(&usd.as_bytes()[12..15], b"USD");
        assert!("XRP".parse::<Currency>().is_err());

        let raw = "0158415500000000C1F76FF6ECB0BAC600000000";
        let custom: Currency = raw.parse().unwrap();
        assert_eq!(custom.to_string(), raw);
        assert!(custom.iso_code().is_none());
    }
}
