//! This module contains the [`Address`] structure and related implementations.

use core::str::FromStr;

use derive_more::Display;
use parity_scale_codec::{Decode, Encode, Input};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Length of an encoded account or contract address.
pub const STRKEY_LEN: usize = 56;

const UNKNOWN: &str = "unknown";

/// Ledger address of an account (`G...`) or a contract (`C...`).
///
/// The textual form is validated for shape only: 56 characters of the
/// RFC 4648 base32 alphabet with a known prefix. The embedded checksum is
/// left to the ledger. The [`Address::unknown`] placeholder parses back to
/// itself.
#[derive(
    Debug,
    Display,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Address(String);

/// What an [`Address`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Externally owned account, `G...`
    Account,
    /// Deployed contract, `C...`
    Contract,
}

impl Address {
    /// Placeholder for a tip whose sender the ledger did not report.
    pub fn unknown() -> Self {
        Self(UNKNOWN.to_owned())
    }

    /// `true` for the [`Address::unknown`] placeholder.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN
    }

    /// Kind of the address, `None` for the placeholder.
    pub fn kind(&self) -> Option<AddressKind> {
        match self.0.as_bytes().first() {
            _ if self.is_unknown() => None,
            Some(b'G') => Some(AddressKind::Account),
            Some(b'C') => Some(AddressKind::Contract),
            _ => None,
        }
    }

    /// `true` if this is an account address.
    pub fn is_account(&self) -> bool {
        self.kind() == Some(AddressKind::Account)
    }

    /// `true` if this is a contract address.
    pub fn is_contract(&self) -> bool {
        self.kind() == Some(AddressKind::Contract)
    }

    /// Textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `GABCDE...VWXYZ1`-style abbreviation keeping `chars` characters on
    /// each side. Short inputs are returned whole.
    pub fn shorten(&self, chars: usize) -> String {
        let len = self.0.len();
        if chars.saturating_mul(2) >= len {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..chars], &self.0[len - chars..])
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNKNOWN {
            return Ok(Self::unknown());
        }
        if s.len() != STRKEY_LEN {
            return Err(AddressError::Length(s.len()));
        }
        match s.chars().next() {
            Some('G' | 'C') => {}
            Some(other) => return Err(AddressError::Prefix(other)),
            None => return Err(AddressError::Length(0)),
        }
        if let Some(bad) = s.chars().find(|c| !matches!(c, 'A'..='Z' | '2'..='7')) {
            return Err(AddressError::Alphabet(bad));
        }
        Ok(Self(s.to_owned()))
    }
}

impl Decode for Address {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let raw = String::decode(input)?;
        raw.parse()
            .map_err(|_| "Address is not a valid account or contract id".into())
    }
}

/// Reasons a string is not an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Addresses are exactly [`STRKEY_LEN`] characters long.
    #[error("expected {STRKEY_LEN} characters, got {0}")]
    Length(usize),
    /// Only `G` and `C` addresses are understood.
    #[error("unsupported address prefix `{0}`")]
    Prefix(char),
    /// Character outside of the base32 alphabet.
    #[error("character `{0}` is not allowed in an address")]
    Alphabet(char),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::restriction)]

    use super::*;

    const ACCOUNT: &str = "GC6QXTLS3XSA3GJPHODE2ZSCQS2LFAOANOZKUFLKBJNXCRVYV6NJB3RI";
    const CONTRACT: &str = "CAYRJABAYNE4Q5PYYILXIUZOWKCHJGMURXXWAD7MXGFHGRRSUG5CCIKF";

    #[test]
    fn parses_accounts_and_contracts() {
        let account: Address = ACCOUNT.parse().unwrap();
        assert_eq!(account.kind(), Some(AddressKind::Account));
        let contract: Address = CONTRACT.parse().unwrap();
        assert!(contract.is_contract());
        assert_eq!(contract.to_string(), CONTRACT);
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!("GABC".parse::<Address>(), Err(AddressError::Length(4)));
        let wrong_prefix = ACCOUNT.replacen('G', "M", 1);
        assert_eq!(
            wrong_prefix.parse::<Address>(),
            Err(AddressError::Prefix('M'))
        );
        let lowercase = ACCOUNT.replacen('C', "c", 1);
        assert_eq!(lowercase.parse::<Address>(), Err(AddressError::Alphabet('c')));
        let digit_one = ACCOUNT.replacen('6', "1", 1);
        assert_eq!(digit_one.parse::<Address>(), Err(AddressError::Alphabet('1')));
    }

    #[test]
    fn unknown_placeholder_has_no_kind() {
        let unknown = Address::unknown();
        assert!(unknown.is_unknown());
        assert_eq!(unknown.kind(), None);
        assert_eq!(unknown.to_string(), "unknown");
    }

    #[test]
    fn unknown_placeholder_survives_text_and_scale() {
        assert_eq!("unknown".parse::<Address>(), Ok(Address::unknown()));
        assert_eq!("Unknown".parse::<Address>(), Err(AddressError::Length(7)));

        let bytes = Address::unknown().encode();
        let decoded = Address::decode(&mut bytes.as_slice()).unwrap();
        assert!(decoded.is_unknown());
    }

    #[test]
    fn shorten_keeps_both_ends() {
        let account: Address = ACCOUNT.parse().unwrap();
        assert_eq!(account.shorten(6), "GC6QXT...NJB3RI");
        assert_eq!(Address::unknown().shorten(6), "unknown");
    }

    #[test]
    fn decoding_validates() {
        let bytes = "not an address".to_owned().encode();
        assert!(Address::decode(&mut bytes.as_slice()).is_err());
        let bytes = ACCOUNT.to_owned().encode();
        assert_eq!(
            Address::decode(&mut bytes.as_slice()).unwrap().as_str(),
            ACCOUNT
        );
    }
}
