//! Wire form shared by every ledger object: base64 over SCALE.

use parity_scale_codec::{DecodeLimit, Encode};

use crate::value::MAX_DEPTH;

/// Failure to read an object from its wire form.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Not valid base64
    #[error("payload is not valid base64")]
    Base64(#[from] base64::DecodeError),
    /// Not a valid encoding of the expected object
    #[error("payload could not be decoded: {0}")]
    Codec(#[from] parity_scale_codec::Error),
}

/// Encode `object` into its wire form.
pub fn to_wire<T: Encode>(object: &T) -> String {
    base64::encode(object.encode())
}

/// Decode an object from its wire form.
///
/// Surrounding whitespace is ignored, trailing bytes are not.
pub fn from_wire<T: DecodeLimit>(encoded: &str) -> Result<T, WireError> {
    let bytes = base64::decode(encoded.trim())?;
    Ok(T::decode_all_with_depth_limit(MAX_DEPTH, &mut bytes.as_slice())?)
}
