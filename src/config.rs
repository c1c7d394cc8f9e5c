use std::{env, fmt, str::FromStr};

use chrono::Duration;
use tracing::{info, warn};

/// Fallback secret used when `ALIAS_SALT` is unset. Anyone who knows it can
/// forge guest cookies, so every real deployment must override it.
pub const DEFAULT_ALIAS_SECRET: &str = "default_salt_value";
pub const DEFAULT_MAIL_DOMAIN: &str = "yourtempmail.com";
pub const DEFAULT_TOKEN_LIFETIME_DAYS: i64 = 7;
pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 3650;

#[derive(Clone)]
pub struct GuestAliasConfig {
    /// The secret mixed into every integrity tag and obfuscation key.
    /// If the secret changes, every guest cookie issued before the change stops resolving.
    pub secret: String,
    /// Mail domain appended to aliases when presenting a full address.
    pub domain: String,
    /// How long issued guest cookies remain valid for.
    pub token_lifetime: Duration,
    /// Mark cookies `Secure`. Should be on whenever the site is served over https.
    pub secure_cookies: bool,
}

impl Default for GuestAliasConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_ALIAS_SECRET.to_string(),
            domain: DEFAULT_MAIL_DOMAIN.to_string(),
            token_lifetime: Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS),
            secure_cookies: false,
        }
    }
}

impl fmt::Debug for GuestAliasConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestAliasConfig")
            .field("secret", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("token_lifetime", &self.token_lifetime)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

impl GuestAliasConfig {
    /// Load from `ALIAS_SALT`, `MAIL_DOMAIN`, `GUEST_ALIAS_LIFETIME_DAYS` and
    /// `SECURE_COOKIES`, falling back to defaults for anything unset or invalid.
    pub fn from_env() -> Self {
        let secret = var("ALIAS_SALT").unwrap_or_else(|_| {
            warn!("ALIAS_SALT not set, guest cookies are signed with the public default secret");
            DEFAULT_ALIAS_SECRET.to_string()
        });

        let lifetime_days: i64 = try_load(
            "GUEST_ALIAS_LIFETIME_DAYS",
            DEFAULT_TOKEN_LIFETIME_DAYS,
        );

        Self {
            secret,
            domain: try_load("MAIL_DOMAIN", DEFAULT_MAIL_DOMAIN.to_string()),
            token_lifetime: lifetime_from_days(lifetime_days),
            secure_cookies: try_load("SECURE_COOKIES", false),
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_ALIAS_SECRET
    }
}

/// Lifetimes outside `1..=MAX_TOKEN_LIFETIME_DAYS` fall back to the default.
fn lifetime_from_days(days: i64) -> Duration {
    let lifetime = match days {
        1..=MAX_TOKEN_LIFETIME_DAYS => Duration::try_days(days),
        _ => None,
    };

    lifetime.unwrap_or_else(|| {
        warn!(
            "GUEST_ALIAS_LIFETIME_DAYS must be between 1 and {MAX_TOKEN_LIFETIME_DAYS}, got {days}, using default: {DEFAULT_TOKEN_LIFETIME_DAYS}"
        );
        Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS)
    })
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + fmt::Debug,
    T::Err: fmt::Display,
{
    match var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default:?}");
            default
        }),
        Err(()) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_documented_values() {
        let config = GuestAliasConfig::default();
        assert!(config.uses_default_secret());
        assert_eq!(config.domain, DEFAULT_MAIL_DOMAIN);
        assert_eq!(config.token_lifetime, Duration::days(7));
        assert!(!config.secure_cookies);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = GuestAliasConfig {
            secret: "hunter2".into(),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn lifetime_is_bounded() {
        assert_eq!(lifetime_from_days(30), Duration::days(30));
        assert_eq!(
            lifetime_from_days(MAX_TOKEN_LIFETIME_DAYS),
            Duration::days(MAX_TOKEN_LIFETIME_DAYS)
        );
        for days in [0, -5, MAX_TOKEN_LIFETIME_DAYS + 1, 100_000_000, i64::MAX] {
            assert_eq!(lifetime_from_days(days), Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS));
        }
    }

    // The only test that touches GUEST_ALIAS_LIFETIME_DAYS, so it can't race another.
    #[test]
    fn from_env_rejects_oversized_lifetime() {
        for raw in ["100000000", "99999999999999", "0"] {
            env::set_var("GUEST_ALIAS_LIFETIME_DAYS", raw);
            let config = GuestAliasConfig::from_env();
            assert_eq!(config.token_lifetime, Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS));

            let codec = crate::GuestIdentityCodec::from_config(&config).unwrap();
            let alias = crate::Alias::parse("demo").unwrap();
            let token = codec.issue(&alias);
            assert_eq!(token.expires_at - token.issued_at, config.token_lifetime);
        }

        env::set_var("GUEST_ALIAS_LIFETIME_DAYS", "30");
        assert_eq!(GuestAliasConfig::from_env().token_lifetime, Duration::days(30));

        env::remove_var("GUEST_ALIAS_LIFETIME_DAYS");
        assert_eq!(
            GuestAliasConfig::from_env().token_lifetime,
            Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS)
        );
    }

    #[test]
    fn try_load_falls_back_on_bad_values() {
        env::set_var("GUEST_ALIAS_TEST_BAD_NUMBER", "seven");
        assert_eq!(try_load("GUEST_ALIAS_TEST_BAD_NUMBER", 7i64), 7);

        env::set_var("GUEST_ALIAS_TEST_GOOD_BOOL", " true ");
        assert!(try_load("GUEST_ALIAS_TEST_GOOD_BOOL", false));

        assert_eq!(try_load("GUEST_ALIAS_TEST_UNSET", 3u8), 3);
    }
}
