//! Inbound command queue for the registry processor.
//!
//! Two overflow policies are supported:
//! - `Unbounded`: every command is accepted while the processor is alive.
//! - `Bounded`: at most `capacity` commands wait in the queue. A command that
//!   arrives while the queue is full is rejected with
//!   [`RegistryError::Unavailable`] instead of blocking the caller.

use std::num::NonZeroUsize;

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Semaphore,
};

use crate::{Command, RegistryError, RegistryResult};

/// Largest capacity a bounded mailbox can have. Larger capacities are clamped.
pub const MAX_MAILBOX_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// Overflow policy for the command queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailboxPolicy {
    /// No limit on queued commands
    #[default]
    Unbounded,

    /// Reject new commands once `capacity` are queued
    Bounded(NonZeroUsize),
}

impl MailboxPolicy {
    /// Bounded policy from an optional capacity; `None` or zero means unbounded
    pub fn from_capacity(capacity: Option<usize>) -> Self {
        capacity
            .and_then(NonZeroUsize::new)
            .map_or(Self::Unbounded, Self::Bounded)
    }
}

/// Creates a connected sender/receiver pair with the given policy
pub fn channel(policy: MailboxPolicy) -> (CommandSender, CommandReceiver) {
    match policy {
        MailboxPolicy::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                CommandSender {
                    inner: SenderInner::Unbounded(tx),
                },
                CommandReceiver {
                    inner: ReceiverInner::Unbounded(rx),
                },
            )
        }
        MailboxPolicy::Bounded(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.get().min(MAX_MAILBOX_CAPACITY));
            (
                CommandSender {
                    inner: SenderInner::Bounded(tx),
                },
                CommandReceiver {
                    inner: ReceiverInner::Bounded(rx),
                },
            )
        }
    }
}

/// Submitting half of the mailbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandSender {
    inner: SenderInner,
}

#[derive(Debug, Clone)]
enum SenderInner {
    Unbounded(mpsc::UnboundedSender<Command>),
    Bounded(mpsc::Sender<Command>),
}

impl CommandSender {
    /// Enqueues a command without waiting.
    ///
    /// On failure the command, including its reply slot, is dropped.
    pub fn submit(&self, command: Command) -> RegistryResult<()> {
        match &self.inner {
            SenderInner::Unbounded(tx) => tx
                .send(command)
                .map_err(|_| RegistryError::ProcessorStopped),
            SenderInner::Bounded(tx) => tx.try_send(command).map_err(|e| match e {
                TrySendError::Full(_) => RegistryError::Unavailable,
                TrySendError::Closed(_) => RegistryError::ProcessorStopped,
            }),
        }
    }
}

/// Receiving half of the mailbox, owned by the processor
#[derive(Debug)]
pub struct CommandReceiver {
    inner: ReceiverInner,
}

#[derive(Debug)]
enum ReceiverInner {
    Unbounded(mpsc::UnboundedReceiver<Command>),
    Bounded(mpsc::Receiver<Command>),
}

impl CommandReceiver {
    /// Waits for the next command in arrival order.
    ///
    /// Returns `None` once every sender has been dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<Command> {
        match &mut self.inner {
            ReceiverInner::Unbounded(rx) => rx.recv().await,
            ReceiverInner::Bounded(rx) => rx.recv().await,
        }
    }
}
