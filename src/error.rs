use warp::reject::Reject;

use crate::types::Alias;

/// Reasons a presented guest identity could not be trusted.
///
/// None of these ever reach the client as a failure: every kind resolves to
/// "no identity". They are kept apart so that logs can tell a first visit from
/// a corrupted cookie or a forged one.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no guest identity cookies present")]
    AbsentIdentity,
    #[error("guest identity cookie could not be decoded: {reason}")]
    MalformedToken { reason: String },
    #[error("guest identity integrity check failed")]
    TamperedOrStale,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasError {
    #[error("alias must contain at least one letter or digit")]
    Empty,
    #[error("alias must be at least {min} characters long")]
    TooShort { min: usize },
    #[error("alias must be at most {max} characters long")]
    TooLong { max: usize },
    #[error("alias may only contain lowercase letters and digits")]
    NotNormalized,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the guest alias secret must not be empty")]
    EmptySecret,
    #[error("guest alias lifetime must be between 1 second and {max_days} days")]
    InvalidLifetime { max_days: i64 },
}

#[derive(thiserror::Error, Debug)]
pub enum GuestAliasError {
    #[error("invalid alias: {source}")]
    InvalidAlias {
        #[from]
        source: AliasError,
    },
    #[error("alias {0} is already taken")]
    AliasTaken(Alias),
    #[error("error during alias registry lookup")]
    RegistryError {
        #[from]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Reject for GuestAliasError {}
