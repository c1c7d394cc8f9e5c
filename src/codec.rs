use std::fmt;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::{
    config::{GuestAliasConfig, MAX_TOKEN_LIFETIME_DAYS},
    error::{ConfigError, IdentityError},
    types::{Alias, IdentityToken},
};

/// Converts aliases to and from the two-cookie guest identity.
///
/// The value cookie holds the alias XORed with the secret and base64url
/// encoded. That only keeps the alias from being readable at a glance; it is
/// not encryption. Trust comes from the tag, a SHA-256 over the alias followed
/// by the secret, which is recomputed from the decoded alias on every read.
///
/// Values written by older deployments in padded standard base64 are still
/// accepted on read; new values are always base64url without padding.
#[derive(Clone)]
pub struct GuestIdentityCodec {
    secret: String,
    token_lifetime: Duration,
}

impl fmt::Debug for GuestIdentityCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestIdentityCodec")
            .field("secret", &"[REDACTED]")
            .field("token_lifetime", &self.token_lifetime)
            .finish()
    }
}

impl GuestIdentityCodec {
    pub fn new(secret: impl Into<String>, token_lifetime: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if token_lifetime <= Duration::zero()
            || token_lifetime > Duration::days(MAX_TOKEN_LIFETIME_DAYS)
        {
            return Err(ConfigError::InvalidLifetime {
                max_days: MAX_TOKEN_LIFETIME_DAYS,
            });
        }

        Ok(Self {
            secret,
            token_lifetime,
        })
    }

    pub fn from_config(config: &GuestAliasConfig) -> Result<Self, ConfigError> {
        Self::new(config.secret.clone(), config.token_lifetime)
    }

    pub fn issue(&self, alias: &Alias) -> IdentityToken {
        self.issue_at(alias, Utc::now())
    }

    pub fn issue_at(&self, alias: &Alias, now: DateTime<Utc>) -> IdentityToken {
        IdentityToken {
            value: self.obfuscate(alias.as_str()),
            tag: self.integrity_tag(alias.as_str()),
            issued_at: now,
            expires_at: now + self.token_lifetime,
        }
    }

    /// Resolve the stored cookie pair to an alias, or `None` if the pair is
    /// missing, unreadable or fails the integrity check.
    pub fn resolve(&self, value: Option<&str>, tag: Option<&str>) -> Option<Alias> {
        match self.try_resolve(value, tag) {
            Ok(alias) => Some(alias),
            Err(IdentityError::AbsentIdentity) => {
                debug!("no guest alias cookies presented");
                None
            }
            Err(IdentityError::MalformedToken { reason }) => {
                info!(%reason, "discarding unreadable guest alias cookie");
                None
            }
            Err(IdentityError::TamperedOrStale) => {
                warn!("guest alias hash mismatch, possible tampering or rotated secret");
                None
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but reports why the pair was rejected.
    pub fn try_resolve(&self, value: Option<&str>, tag: Option<&str>) -> Result<Alias, IdentityError> {
        let (value, tag) = match (present(value), present(tag)) {
            (Some(value), Some(tag)) => (value, tag),
            _ => return Err(IdentityError::AbsentIdentity),
        };

        let decoded = self.deobfuscate(value)?;
        if decoded.is_empty() {
            return Err(IdentityError::MalformedToken {
                reason: "decoded alias is empty".into(),
            });
        }

        let expected = self.integrity_tag(&decoded);
        if !bool::from(expected.as_bytes().ct_eq(tag.as_bytes())) {
            return Err(IdentityError::TamperedOrStale);
        }

        Alias::parse(&decoded).map_err(|e| IdentityError::MalformedToken {
            reason: e.to_string(),
        })
    }

    /// An empty token that expired at the epoch. Storing it in place of the
    /// current one makes the client drop both cookies.
    pub fn wipe(&self) -> IdentityToken {
        IdentityToken {
            value: String::new(),
            tag: String::new(),
            issued_at: DateTime::<Utc>::UNIX_EPOCH,
            expires_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    fn integrity_tag(&self, alias: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(alias.as_bytes());
        hasher.update(self.secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn obfuscate(&self, alias: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.xor_with_secret(alias.as_bytes()))
    }

    fn deobfuscate(&self, value: &str) -> Result<String, IdentityError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(value)
            .or_else(|e| STANDARD.decode(value).map_err(|_| e))
            .map_err(|e| IdentityError::MalformedToken {
                reason: e.to_string(),
            })?;

        String::from_utf8(self.xor_with_secret(&bytes)).map_err(|e| IdentityError::MalformedToken {
            reason: e.to_string(),
        })
    }

    fn xor_with_secret(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .zip(self.secret.as_bytes().iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

fn present(piece: Option<&str>) -> Option<&str> {
    piece.filter(|p| !p.is_empty())
}
