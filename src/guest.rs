use std::{error::Error, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    codec::GuestIdentityCodec,
    config::GuestAliasConfig,
    cookie::SetCookie,
    error::{ConfigError, GuestAliasError},
    types::Alias,
};

#[async_trait]
pub trait AliasRegistry: Send + Sync + 'static {
    /// Return true if a registered profile has already claimed the given alias.
    async fn is_alias_taken(&self, alias: &Alias) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

pub(crate) struct GuestAliasInternal {
    codec: GuestIdentityCodec,
    config: GuestAliasConfig,
    registry: Option<Arc<dyn AliasRegistry>>,
}

impl GuestAliasInternal {
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Issue a fresh token for `alias` and the cookies that store it.
    pub fn persist(&self, alias: &Alias) -> [SetCookie; 2] {
        let token = self.codec.issue(alias);
        SetCookie::pair(&token, token.issued_at, self.config.secure_cookies)
    }

    pub fn resolve(&self, value: Option<&str>, tag: Option<&str>) -> Option<Alias> {
        self.codec.resolve(value, tag)
    }

    pub fn wipe(&self) -> [SetCookie; 2] {
        SetCookie::pair(&self.codec.wipe(), Utc::now(), self.config.secure_cookies)
    }

    pub async fn is_available(&self, alias: &Alias) -> Result<bool, GuestAliasError> {
        let registry = match &self.registry {
            Some(registry) => registry,
            None => return Ok(true),
        };

        let taken = registry.is_alias_taken(alias).await?;

        Ok(!taken)
    }
}

#[derive(Clone)]
pub struct GuestAlias {
    pub(crate) internal: Arc<GuestAliasInternal>,
}

impl GuestAlias {
    pub fn new(config: GuestAliasConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Like [`new`](Self::new), but custom aliases are checked against `registry`
    /// before they are issued. Lookups run concurrently, so the registry handles
    /// its own synchronization.
    pub fn with_registry(
        config: GuestAliasConfig,
        registry: Arc<dyn AliasRegistry>,
    ) -> Result<Self, ConfigError> {
        Self::build(config, Some(registry))
    }

    fn build(
        config: GuestAliasConfig,
        registry: Option<Arc<dyn AliasRegistry>>,
    ) -> Result<Self, ConfigError> {
        let codec = GuestIdentityCodec::from_config(&config)?;
        if config.uses_default_secret() {
            tracing::warn!("guest alias cookies are using the default secret, set ALIAS_SALT");
        }

        Ok(Self {
            internal: Arc::new(GuestAliasInternal {
                codec,
                config,
                registry,
            }),
        })
    }

    pub fn codec(&self) -> &GuestIdentityCodec {
        &self.internal.codec
    }
}
