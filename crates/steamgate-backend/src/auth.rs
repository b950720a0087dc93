//! Authentication types and failure classification.

use std::fmt;

use steamgate_config::ConfigError;
use steamgate_core::SteamId;

/// Account credentials for the primary actor.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub account_name: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_name", &self.account_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Second-factor material available for a logon attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardMaterial {
    /// Persistent artifact issued by a previous logon (sentry bytes).
    Artifact(Vec<u8>),
    /// One-time challenge code supplied interactively.
    Code(String),
}

/// A logon attempt against the primary actor.
#[derive(Clone, Debug)]
pub struct LogonRequest {
    /// Account credentials.
    pub credentials: Credentials,
    /// Second-factor material, when any is available.
    pub guard: Option<GuardMaterial>,
}

/// Successful logon outcome.
#[derive(Clone, Copy, Debug)]
pub struct LogonSuccess {
    /// Identity established for the session.
    pub identity: SteamId,
}

/// Classified authentication failure reported by the primary actor.
#[derive(Clone, Debug, thiserror::Error)]
pub enum AuthFailure {
    /// Account name or password rejected.
    #[error("invalid account name or password")]
    InvalidCredentials,

    /// The account holds an active session elsewhere.
    #[error("account already logged in elsewhere")]
    AlreadyActiveElsewhere,

    /// A guard challenge (second factor) must be answered.
    #[error("guard challenge required")]
    ChallengeRequired,

    /// Any other failure, surfaced as-is.
    #[error("authentication failed: {0}")]
    Other(String),
}

/// Fatal conditions that terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// First logon rejected the credentials; the stored ones were cleared.
    #[error(
        "your account name and/or password is invalid; stored credentials were cleared, run setup again"
    )]
    InvalidCredentials,

    /// Re-authentication rejected credentials that previously worked.
    #[error("your password is invalid; edit the configuration record to fix it")]
    CredentialsRejected,

    /// The account holds an active session elsewhere.
    #[error("this account is already logged in elsewhere")]
    AlreadyActiveElsewhere,

    /// Supplied guard material was rejected.
    #[error(
        "your guard material is invalid; remove \"steamGuard\" from the configuration record to request a new code"
    )]
    GuardRejected,

    /// Unclassified authentication failure, surfaced as-is.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Credentials missing from the configuration record.
    #[error("configuration record has no credentials; run setup first")]
    MissingCredentials,

    /// Configuration persistence or interactive input failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
