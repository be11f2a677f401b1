use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::MarketDataError;

const MIN_LEN: usize = 32;
const MAX_LEN: usize = 44;

/// A validated Solana token mint address.
///
/// Construction goes through [`TokenAddress::parse`], so every value held by
/// the aggregator has already passed input validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Parse and validate a base58 mint address (32-44 chars, no `0OIl`).
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, MarketDataError> {
        let address = input.trim();

        if address.is_empty() {
            return Err(MarketDataError::InvalidTokenAddress(
                "token address is required".to_string(),
            ));
        }

        if let Some(bad) = address.chars().find(|c| !is_base58(*c)) {
            return Err(MarketDataError::InvalidTokenAddress(format!(
                "'{}' is not a base58 character",
                bad
            )));
        }

        let len = address.len();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(MarketDataError::InvalidTokenAddress(format!(
                "expected {}-{} characters, got {}",
                MIN_LEN, MAX_LEN, len
            )));
        }

        Ok(Self(address.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_base58(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TokenAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TokenAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
