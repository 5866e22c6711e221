//! Self-describing values exchanged with contracts.
//!
//! Contract arguments and return values travel as [`Value`], a tagged
//! tree. On the wire a value is SCALE-encoded and then base64-encoded.

use derive_more::From;
use parity_scale_codec::{Decode, DecodeLimit, Encode};

use crate::{
    address::Address,
    codec::{self, WireError},
};

/// Nesting limit applied when decoding untrusted values.
pub const MAX_DEPTH: u32 = 64;

/// Tagged contract value.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, From)]
pub enum Value {
    /// Unit, returned by functions without a result.
    #[from(ignore)]
    Void,
    /// Boolean
    Bool(bool),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 128-bit integer
    U128(u128),
    /// Signed 128-bit integer, used for every amount
    I128(i128),
    /// Opaque bytes
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Short identifier, used for map keys of records
    #[from(ignore)]
    Symbol(String),
    /// Account or contract address
    Address(Address),
    /// Ordered sequence
    Vec(Vec<Value>),
    /// Ordered key-value pairs
    Map(Vec<MapEntry>),
}

/// One key-value pair of [`Value::Map`].
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MapEntry {
    /// Key, usually a [`Value::Symbol`]
    pub key: Value,
    /// Associated value
    pub val: Value,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<tipjar_primitives::amount::Amount> for Value {
    fn from(value: tipjar_primitives::amount::Amount) -> Self {
        Self::I128(value.base_units())
    }
}

impl Value {
    /// Build a [`Value::Symbol`].
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Build a record-like map keyed by symbols.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(
            fields
                .into_iter()
                .map(|(key, val)| MapEntry {
                    key: Self::symbol(key),
                    val,
                })
                .collect(),
        )
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool(_) => "bool",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::U128(_) => "u128",
            Self::I128(_) => "i128",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Address(_) => "address",
            Self::Vec(_) => "vec",
            Self::Map(_) => "map",
        }
    }

    /// Any integer variant widened to `i128`, if it fits.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::U32(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::U64(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            Self::U128(v) => i128::try_from(v).ok(),
            Self::I128(v) => Some(v),
            _ => None,
        }
    }

    /// Contents of a string or symbol.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a sequence.
    pub fn as_vec(&self) -> Option<&[Value]> {
        match self {
            Self::Vec(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map.
    pub fn as_map(&self) -> Option<&[MapEntry]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Value stored under the string or symbol key `name` of a map.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|entry| entry.key.as_str() == Some(name))
            .map(|entry| &entry.val)
    }

    /// SCALE encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode()
    }

    /// Decode from SCALE bytes, rejecting trailing data and nesting deeper
    /// than [`MAX_DEPTH`].
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, parity_scale_codec::Error> {
        Self::decode_all_with_depth_limit(MAX_DEPTH, &mut bytes)
    }

    /// Wire form, base64 of the SCALE encoding.
    pub fn to_base64(&self) -> String {
        codec::to_wire(self)
    }

    /// Parse the wire form.
    pub fn from_base64(encoded: &str) -> Result<Self, WireError> {
        codec::from_wire(encoded)
    }
}
