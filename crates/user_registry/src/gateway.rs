//! Ask-with-timeout access to the registry processor.
//!
//! Flow:
//! 1. Create a fresh `oneshot` reply slot
//! 2. Build the command around the sender and submit it to the mailbox
//! 3. Wait on the receiver for at most `ask_timeout`
//!
//! A timeout only stops the waiting. The command is already queued and may
//! still be applied; its late reply goes to a dropped receiver and is
//! discarded by the processor.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::warn;

use crate::{
    Command, CommandSender, Credentials, NewUser, RegistryError, RegistryResult, UserRecord,
};

/// Caller-facing handle to the registry. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RequestGateway {
    mailbox: CommandSender,
    ask_timeout: Duration,
}

impl RequestGateway {
    /// Creates a gateway submitting to `mailbox` and waiting at most
    /// `ask_timeout` for each reply
    pub fn new(mailbox: CommandSender, ask_timeout: Duration) -> Self {
        Self {
            mailbox,
            ask_timeout,
        }
    }

    /// The fixed reply timeout of this gateway
    pub fn ask_timeout(&self) -> Duration {
        self.ask_timeout
    }

    /// Sends a command built by `make_command` and waits for its reply.
    pub async fn request<R>(
        &self,
        make_command: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> RegistryResult<R> {
        let (reply_to, reply) = oneshot::channel();
        let command = make_command(reply_to);
        let kind = command.kind();

        self.mailbox.submit(command).inspect_err(|e| {
            warn!(command = kind, error = %e, "Registry rejected command");
        })?;

        match tokio::time::timeout(self.ask_timeout, reply).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => {
                warn!(command = kind, "Reply slot dropped without a reply");
                Err(RegistryError::ReplyDropped)
            }
            Err(_) => {
                warn!(
                    command = kind,
                    timeout_ms = self.ask_timeout.as_millis() as u64,
                    "Registry request timed out"
                );
                Err(RegistryError::RequestTimedOut {
                    timeout: self.ask_timeout,
                })
            }
        }
    }

    /// Registers a new user; fails with `DuplicateEmail` if the email is taken
    pub async fn create_user(&self, user: NewUser) -> RegistryResult<()> {
        let email = user.email.clone();
        let result = self
            .request(|reply_to| Command::CreateUser { user, reply_to })
            .await?;

        if result.success {
            Ok(())
        } else {
            Err(RegistryError::duplicate_email(email))
        }
    }

    /// Checks credentials; fails with `AuthenticationFailed` on any mismatch
    pub async fn authenticate(&self, credentials: Credentials) -> RegistryResult<()> {
        let result = self
            .request(|reply_to| Command::AuthenticateUser {
                credentials,
                reply_to,
            })
            .await?;

        if result.success {
            Ok(())
        } else {
            Err(RegistryError::AuthenticationFailed)
        }
    }

    /// Fetches the user registered under `email`
    pub async fn lookup(&self, email: impl Into<String>) -> RegistryResult<Option<UserRecord>> {
        let email = email.into();
        let result = self
            .request(|reply_to| Command::LookupUser { email, reply_to })
            .await?;
        Ok(result.user)
    }
}
