//! Registry command protocol

use tokio::sync::oneshot;

use crate::{Credentials, NewUser, UserRecord};

/// Reply to a create or authenticate command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
}

/// Reply to a lookup command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub user: Option<UserRecord>,
}

/// A request to the registry processor.
///
/// Every command carries its own single-use reply slot. The processor sends
/// exactly one reply into it.
#[derive(Debug)]
pub enum Command {
    /// Register a new user
    CreateUser {
        user: NewUser,
        reply_to: oneshot::Sender<ActionResult>,
    },

    /// Check a username/password pair
    AuthenticateUser {
        credentials: Credentials,
        reply_to: oneshot::Sender<ActionResult>,
    },

    /// Fetch a user by email
    LookupUser {
        email: String,
        reply_to: oneshot::Sender<LookupResult>,
    },
}

impl Command {
    /// Short name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreateUser { .. } => "create_user",
            Command::AuthenticateUser { .. } => "authenticate_user",
            Command::LookupUser { .. } => "lookup_user",
        }
    }
}
