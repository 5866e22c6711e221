//! Data primitives used by the tip client, but not related directly to
//! the ledger-specific data model.
//!
//! If you need a thin wrapper around a number or string format so that it
//! can be used with [`parity_scale_codec`]'s `Encode` and `Decode`, add it
//! as a submodule to this crate rather than into `tipjar_data_model`.

pub mod amount;

/// Export of inner items.
pub mod prelude {
    pub use super::amount::{Amount, AmountError};
}
