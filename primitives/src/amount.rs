//! Fixed-point amounts with exactly seven decimal places.
//!
//! The ledger stores every quantity as an integer count of base units
//! (`1 token = 10^7 units`). Users type decimal strings. [`to_base_units`]
//! and [`to_decimal`] convert between the two without ever going through a
//! floating-point representation, so integral and up-to-7-decimal inputs
//! always round-trip exactly.

use core::{fmt, str::FromStr};

use parity_scale_codec::{Decode, Encode, Input};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Number of fractional digits carried by one base unit.
pub const DECIMALS: usize = 7;

/// Base units in one whole token, `10^DECIMALS`.
pub const UNITS_PER_TOKEN: i128 = 10_000_000;

/// Non-negative quantity of base units.
///
/// `Display` produces the canonical decimal form and `FromStr` accepts
/// any decimal string understood by [`to_base_units`]. Serialized as the
/// decimal string, SCALE-encoded as the raw `i128`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Amount(i128);

impl Amount {
    /// Constant, representing zero value
    pub const ZERO: Self = Self(0);

    /// Wrap a count of base units.
    ///
    /// # Errors
    /// If `units` is negative.
    pub fn from_base_units(units: i128) -> Result<Self, AmountError> {
        if units < 0 {
            return Err(AmountError::Negative);
        }
        Ok(Self(units))
    }

    /// Count of base units.
    #[inline]
    pub const fn base_units(self) -> i128 {
        self.0
    }

    /// Checks if this instance is zero
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl TryFrom<i128> for Amount {
    type Error = AmountError;

    fn try_from(units: i128) -> Result<Self, Self::Error> {
        Self::from_base_units(units)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(decimal: &str) -> Result<Self, Self::Err> {
        to_base_units(decimal).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.0))
    }
}

impl Decode for Amount {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let units = i128::decode(input)?;
        Self::from_base_units(units).map_err(|_| "Amount must not be negative".into())
    }
}

/// Reasons a decimal string or integer is not a valid amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Nothing but whitespace was supplied.
    #[error("amount is empty")]
    Empty,
    /// The input is not `digits[.digits]`.
    #[error("`{input}` is not a valid decimal amount")]
    Malformed {
        /// Offending input, as given.
        input: String,
    },
    /// Amounts are never negative.
    #[error("amount must not be negative")]
    Negative,
    /// The base-unit value does not fit into 128 bits.
    #[error("amount is too large")]
    Overflow,
}

/// Convert a decimal string into base units.
///
/// The fractional part is right-padded with zeros to seven digits, and
/// anything past the seventh digit is dropped (truncation, not rounding).
/// An empty whole part is read as zero when a fractional part is present
/// (`".5"`), and an empty fractional part is allowed (`"1."`).
///
/// # Errors
/// - [`AmountError::Empty`] for blank input
/// - [`AmountError::Negative`] for a leading minus sign
/// - [`AmountError::Malformed`] for signs, separators, exponents, several
///   points or any other non-digit
/// - [`AmountError::Overflow`] if the result does not fit into `i128`
pub fn to_base_units(decimal: &str) -> Result<i128, AmountError> {
    let trimmed = decimal.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let malformed = || AmountError::Malformed {
        input: decimal.to_owned(),
    };
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(malformed());
    }

    let whole_units: i128 = if whole.is_empty() {
        0
    } else {
        // Only digits are left, so parsing can fail on overflow alone.
        whole.parse().map_err(|_| AmountError::Overflow)?
    };

    let mut padded = [b'0'; DECIMALS];
    for (slot, digit) in padded.iter_mut().zip(fraction.bytes()) {
        *slot = digit;
    }
    let fraction_units = padded
        .iter()
        .fold(0_i128, |acc, digit| acc * 10 + i128::from(digit - b'0'));

    whole_units
        .checked_mul(UNITS_PER_TOKEN)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or(AmountError::Overflow)
}

/// Convert base units into the canonical decimal string.
///
/// Trailing fractional zeros are stripped and a whole number is printed
/// without a decimal point: `10_000_000 -> "1"`, `15_000_000 -> "1.5"`.
///
/// # Errors
/// [`AmountError::Negative`] if `units < 0`.
pub fn to_decimal(units: i128) -> Result<String, AmountError> {
    if units < 0 {
        return Err(AmountError::Negative);
    }
    Ok(format_units(units))
}

fn format_units(units: i128) -> String {
    let whole = units / UNITS_PER_TOKEN;
    let remainder = units % UNITS_PER_TOKEN;
    let fraction = format!("{remainder:0width$}", width = DECIMALS);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::restriction)]

    use parity_scale_codec::DecodeAll;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn canonical_decimal() {
        assert_eq!(to_decimal(10_000_000).unwrap(), "1");
        assert_eq!(to_decimal(15_000_000).unwrap(), "1.5");
        assert_eq!(to_decimal(0).unwrap(), "0");
        assert_eq!(to_decimal(1).unwrap(), "0.0000001");
        assert_eq!(to_decimal(35_000_000).unwrap(), "3.5");
    }

    #[test]
    fn fraction_is_truncated_not_rounded() {
        assert_eq!(to_base_units("1.123456789").unwrap(), 11_234_567);
        assert_eq!(to_base_units("0.99999999").unwrap(), 9_999_999);
    }

    #[test]
    fn lenient_but_unambiguous_forms() {
        assert_eq!(to_base_units("3.5").unwrap(), 35_000_000);
        assert_eq!(to_base_units(".5").unwrap(), 5_000_000);
        assert_eq!(to_base_units("1.").unwrap(), 10_000_000);
        assert_eq!(to_base_units(" 2 ").unwrap(), 20_000_000);
        assert_eq!(to_base_units("007").unwrap(), 70_000_000);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(to_base_units(""), Err(AmountError::Empty));
        assert_eq!(to_base_units("   "), Err(AmountError::Empty));
        assert_eq!(to_base_units("-1"), Err(AmountError::Negative));
        for input in [".", "abc", "+1", "1,5", "1e5", "1.2.3", "1.-2", "0x10"] {
            assert!(
                matches!(to_base_units(input), Err(AmountError::Malformed { .. })),
                "{input} should be rejected"
            );
        }
        assert_eq!(
            to_base_units("99999999999999999999999999999999999999"),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn negative_units_are_rejected() {
        assert_eq!(to_decimal(-1), Err(AmountError::Negative));
        assert_eq!(Amount::from_base_units(-5), Err(AmountError::Negative));
    }

    #[test]
    fn serde_uses_decimal_string() {
        let amount: Amount = "1.5".parse().unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"1.5\"");
        let back: Amount = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(back, amount);
        assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
    }

    #[test]
    fn scale_decoding_rejects_negative_units() {
        let bytes = (-1_i128).encode();
        assert!(Amount::decode_all(&mut bytes.as_slice()).is_err());

        let bytes = 42_i128.encode();
        assert_eq!(
            Amount::decode_all(&mut bytes.as_slice()).unwrap().base_units(),
            42
        );
    }

    proptest! {
        #[test]
        fn base_units_round_trip(units in 0..=i128::MAX) {
            let decimal = to_decimal(units).unwrap();
            prop_assert_eq!(to_base_units(&decimal).unwrap(), units);
        }

        #[test]
        fn canonical_strings_round_trip(
            whole in any::<u64>(),
            fraction in proptest::option::of("[0-9]{0,6}[1-9]"),
        ) {
            let decimal = match fraction {
                Some(fraction) => format!("{whole}.{fraction}"),
                None => whole.to_string(),
            };
            let units = to_base_units(&decimal).unwrap();
            prop_assert_eq!(to_decimal(units).unwrap(), decimal);
        }
    }
}
