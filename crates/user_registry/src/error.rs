//! Registry error types.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the registry to its callers.
///
/// `DuplicateEmail` and `AuthenticationFailed` are logical outcomes of a
/// command that was fully processed. The remaining variants mean the caller
/// does not know whether (or how) its command was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A user with this email is already registered.
    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    /// Unknown email or wrong password. The two cases are not distinguished.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// No reply arrived within the ask timeout. The command may still be applied.
    #[error("Request timed out after {}ms", timeout.as_millis())]
    RequestTimedOut { timeout: Duration },

    /// The bounded mailbox is full and the command was rejected.
    #[error("Registry unavailable: mailbox is full")]
    Unavailable,

    /// The processor is no longer accepting commands.
    #[error("Registry processor has stopped")]
    ProcessorStopped,

    /// The reply slot was dropped without a reply being sent.
    #[error("Reply channel dropped before a reply was sent")]
    ReplyDropped,
}

impl RegistryError {
    /// Creates a duplicate email error.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Returns true if the command was rejected by the registry itself, as
    /// opposed to the caller not knowing the outcome.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::DuplicateEmail { .. } | Self::AuthenticationFailed)
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
