use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::IdentityToken;

/// Cookie holding the obfuscated alias. Never readable from page scripts.
pub const ALIAS_COOKIE: &str = "guest_alias";
/// Cookie holding the integrity tag. Left readable so the page can tell
/// whether a guest identity exists without a round trip.
pub const HASH_COOKIE: &str = "guest_hash";

/// One `Set-Cookie` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: &'static str,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub max_age: i64,
    pub http_only: bool,
    pub secure: bool,
}

impl SetCookie {
    /// The two cookies that store `token`: the value cookie is `HttpOnly`, the
    /// tag cookie is not. Both are `SameSite=Lax` and scoped to `/`.
    pub fn pair(token: &IdentityToken, now: DateTime<Utc>, secure: bool) -> [SetCookie; 2] {
        let max_age = (token.expires_at - now).num_seconds().max(0);

        [
            SetCookie {
                name: ALIAS_COOKIE,
                value: token.value.clone(),
                expires: token.expires_at,
                max_age,
                http_only: true,
                secure,
            },
            SetCookie {
                name: HASH_COOKIE,
                value: token.tag.clone(),
                expires: token.expires_at,
                max_age,
                http_only: false,
                secure,
            },
        ]
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path=/; Expires={}; Max-Age={}; SameSite=Lax",
            self.name,
            self.value,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.max_age,
        )?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}
