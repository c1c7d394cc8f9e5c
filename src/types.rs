use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{alias_string_ext::AliasStringExt, error::AliasError};

pub const MIN_ALIAS_LEN: usize = 3;
pub const MAX_ALIAS_LEN: usize = 20;

const ALIAS_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const RANDOM_ALIAS_PREFIX_LEN: usize = 5;

/// The local part of a disposable address: `[a-z0-9]{3,20}`.
///
/// Only constructed through [`Alias::parse`] or [`Alias::normalize`], so any
/// value of this type already satisfies the alias rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Alias(String);

impl Alias {
    /// Accept `input` only if it is already in normalized form.
    pub fn parse(input: &str) -> Result<Self, AliasError> {
        if input.is_empty() {
            return Err(AliasError::Empty);
        }
        if input.normalize_alias() != input {
            return Err(AliasError::NotNormalized);
        }
        Self::check_len(input)?;
        Ok(Self(input.to_string()))
    }

    /// Lowercase `input`, strip everything but ASCII letters and digits, then
    /// validate the length of what is left.
    pub fn normalize(input: &str) -> Result<Self, AliasError> {
        let clean = input.normalize_alias();
        if clean.is_empty() {
            return Err(AliasError::Empty);
        }
        Self::check_len(&clean)?;
        Ok(Self(clean))
    }

    /// A fresh throwaway alias: five random characters followed by the last
    /// four digits of the current millisecond timestamp, e.g. `a7x9k2301`.
    pub fn generate() -> Self {
        let random = Uuid::new_v4();
        let prefix: String = random
            .as_bytes()
            .iter()
            .take(RANDOM_ALIAS_PREFIX_LEN)
            .map(|b| ALIAS_ALPHABET[*b as usize % ALIAS_ALPHABET.len()] as char)
            .collect();
        let stamp = Utc::now().timestamp_millis().rem_euclid(10_000);

        Self(format!("{prefix}{stamp:04}"))
    }

    fn check_len(alias: &str) -> Result<(), AliasError> {
        match alias.len() {
            n if n < MIN_ALIAS_LEN => Err(AliasError::TooShort { min: MIN_ALIAS_LEN }),
            n if n > MAX_ALIAS_LEN => Err(AliasError::TooLong { max: MAX_ALIAS_LEN }),
            _ => Ok(()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `alias@domain`
    pub fn address(&self, domain: &str) -> String {
        format!("{}@{}", self.0, domain)
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Alias {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The two pieces of client state that carry a guest identity, plus the
/// window they are valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken {
    /// Obfuscated alias, stored in the script-inaccessible cookie.
    pub value: String,
    /// Hex SHA-256 of alias and secret, stored in the script-readable cookie.
    pub tag: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IdentityToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
pub struct SetAliasRequest {
    pub alias: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckAliasQuery {
    pub alias: String,
}

#[derive(Debug, Serialize)]
pub struct AliasResponse {
    pub alias: Option<Alias>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AliasAvailabilityResponse {
    pub alias: Alias,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
