//! Wallet-derived identities
//!
//! An [`Address`] is the externally-issued identity string for every actor in
//! the system: the connected user, file owners, and share recipients. The
//! wallet is the only source of addresses; this crate never mints one.
//!
//! Addresses compare case-insensitively on chain, so the canonical form here
//! is lowercase hex. Parsing is the single validation point: once an
//! `Address` exists it is syntactically valid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::client::Error;

/// A wallet-derived address: `0x` followed by 40 hex characters.
///
/// Stored in canonical lowercase form; equality and hashing operate on that
/// form, so `0xABCD...` and `0xabcd...` are the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and canonicalize an address string.
    ///
    /// Accepts any hex casing; rejects anything that is not `0x` + 40 hex
    /// characters with [`Error::InvalidArgument`].
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| Error::InvalidArgument(format!("address missing 0x prefix: {}", s)))?;

        if hex_part.len() != 40 {
            return Err(Error::InvalidArgument(format!(
                "address must be 40 hex characters, got {}",
                hex_part.len()
            )));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidArgument(format!(
                "address contains non-hex characters: {}",
                s
            )));
        }

        Ok(Address(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// The canonical lowercase form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated display form (`0x1234…abcd`) for logs and UIs.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> String {
        a.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x70dD105c6D5F4be9aa803618abfCbBC5Fa1B1B82";

    #[test]
    fn test_parse_canonicalizes_to_lowercase() {
        let addr = Address::parse(ALICE).unwrap();
        assert_eq!(addr.as_str(), "0x70dd105c6d5f4be9aa803618abfcbbc5fa1b1b82");
    }

    #[test]
    fn test_equality_is_case_insensitive() {
        let upper = Address::parse(ALICE).unwrap();
        let lower = Address::parse(&ALICE.to_ascii_lowercase()).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_rejects_missing_prefix() {
        let err = Address::parse("70dd105c6d5f4be9aa803618abfcbbc5fa1b1b82").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0x").is_err());
        assert!(Address::parse("").is_err());
    }

    #[test]
    fn test_rejects_non_hex() {
        let err = Address::parse("0xzzdd105c6d5f4be9aa803618abfcbbc5fa1b1b82").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_short_form() {
        let addr = Address::parse(ALICE).unwrap();
        assert_eq!(addr.short(), "0x70dd…1b82");
    }

    #[test]
    fn test_serde_round_trip() {
        let addr = Address::parse(ALICE).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x70dd105c6d5f4be9aa803618abfcbbc5fa1b1b82\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let result: Result<Address, _> = serde_json::from_str("\"not-an-address\"");
        assert!(result.is_err());
    }
}
