//! Typed views over [`Value`] trees returned by contract queries.
//!
//! Decoding is lenient at the collection level: [`decode_sequence`] keeps
//! every element that decodes and counts the ones that did not, so one
//! malformed record never hides the rest.

use tipjar_primitives::amount::Amount;

use crate::{address::Address, value::Value};

/// A value did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The variant is not the one required.
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        /// Required shape
        expected: &'static str,
        /// Variant actually found
        found: &'static str,
    },
    /// A required record field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// Right shape, unacceptable content.
    #[error("invalid value: {0}")]
    Invalid(String),
}

impl DecodeError {
    fn unexpected(expected: &'static str, found: &Value) -> Self {
        Self::UnexpectedType {
            expected,
            found: found.type_name(),
        }
    }
}

/// Conversion from a contract [`Value`].
pub trait FromValue: Sized {
    /// Decode `value` as `Self`.
    ///
    /// # Errors
    /// If `value` has the wrong shape.
    fn from_value(value: &Value) -> Result<Self, DecodeError>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(DecodeError::unexpected("bool", other)),
        }
    }
}

impl FromValue for i128 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value
            .as_integer()
            .ok_or_else(|| DecodeError::unexpected("integer", value))
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let wide = i128::from_value(value)?;
        u64::try_from(wide).map_err(|_| DecodeError::Invalid(format!("{wide} is out of range")))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| DecodeError::unexpected("string", value))
    }
}

impl FromValue for Address {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Address(address) => Ok(address.clone()),
            Value::String(s) => s
                .parse()
                .map_err(|err| DecodeError::Invalid(format!("{err}"))),
            other => Err(DecodeError::unexpected("address", other)),
        }
    }
}

/// Amounts arrive as integers of base units. Some indexers render large
/// integers as digit strings, which are accepted as base units too.
impl FromValue for Amount {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let units = match value {
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
                .parse::<i128>()
                .map_err(|_| DecodeError::Invalid(format!("`{s}` overflows")))?,
            other => i128::from_value(other)
                .map_err(|_| DecodeError::unexpected("amount", other))?,
        };
        Amount::from_base_units(units).map_err(|err| DecodeError::Invalid(err.to_string()))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value
            .as_vec()
            .ok_or_else(|| DecodeError::unexpected("vec", value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Void => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Result of a lenient collection decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDecode<T> {
    /// Elements that decoded, in ledger order
    pub items: Vec<T>,
    /// Number of elements that were dropped
    pub skipped: usize,
}

impl<T> Default for PartialDecode<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

/// Decode every element of a sequence, skipping the malformed ones.
///
/// A non-sequence yields an empty result. `Void` is an empty sequence.
pub fn decode_sequence<T>(
    value: &Value,
    mut decode: impl FnMut(&Value) -> Result<T, DecodeError>,
) -> PartialDecode<T> {
    let Some(elements) = value.as_vec() else {
        return PartialDecode {
            items: Vec::new(),
            skipped: usize::from(!matches!(value, Value::Void)),
        };
    };
    let mut out = PartialDecode {
        items: Vec::with_capacity(elements.len()),
        skipped: 0,
    };
    for element in elements {
        match decode(element) {
            Ok(item) => out.items.push(item),
            Err(_) => out.skipped += 1,
        }
    }
    out
}
