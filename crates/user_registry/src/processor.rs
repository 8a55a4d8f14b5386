//! Single-writer command processor.
//!
//! The processor owns the [`UserStore`] and applies commands strictly one at a
//! time, in mailbox order. Each command gets exactly one reply, delivered with
//! a non-blocking `oneshot` send before the next command is taken. A reply
//! whose receiver is gone (for example after an ask timeout) is discarded.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{ActionResult, Command, CommandReceiver, LookupResult, UserStore};

/// Serializes every operation against a [`UserStore`]
#[derive(Debug)]
pub struct RegistryProcessor {
    store: UserStore,
    processed: u64,
}

impl RegistryProcessor {
    /// Creates a processor owning `store`
    pub fn new(store: UserStore) -> Self {
        Self {
            store,
            processed: 0,
        }
    }

    /// Number of commands handled so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Read access to the owned store
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Applies one command and delivers its reply.
    pub fn handle(&mut self, command: Command) {
        let kind = command.kind();

        let delivered = match command {
            Command::CreateUser { user, reply_to } => {
                let email = user.email.clone();
                let created = self.store.create(user);
                match &created {
                    Some(record) => {
                        info!(user_id = %record.id, email = %record.email, "User created")
                    }
                    None => debug!(email = %email, "Email already registered"),
                }
                reply_to
                    .send(ActionResult {
                        success: created.is_some(),
                    })
                    .is_ok()
            }
            Command::AuthenticateUser {
                credentials,
                reply_to,
            } => {
                let success = self.store.authenticate(&credentials);
                debug!(username = %credentials.username, success, "Authentication checked");
                reply_to.send(ActionResult { success }).is_ok()
            }
            Command::LookupUser { email, reply_to } => {
                let user = self.store.lookup(&email);
                debug!(email = %email, found = user.is_some(), "User lookup");
                reply_to.send(LookupResult { user }).is_ok()
            }
        };

        self.processed += 1;

        if !delivered {
            debug!(command = kind, "Reply receiver dropped, discarding reply");
        }
    }

    /// Processes commands until every sender has been dropped, then returns
    /// the store.
    pub async fn run(mut self, mut mailbox: CommandReceiver) -> UserStore {
        info!("Registry processor started");

        while let Some(command) = mailbox.recv().await {
            self.handle(command);
        }

        info!(
            processed = self.processed,
            users = self.store.len(),
            "Registry processor stopped"
        );
        self.store
    }

    /// Runs the processor on its own task
    pub fn spawn(self, mailbox: CommandReceiver) -> JoinHandle<UserStore> {
        tokio::spawn(self.run(mailbox))
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;
    use crate::{mailbox, Credentials, MailboxPolicy, NewUser};

    fn create(processor: &mut RegistryProcessor, email: &str, password: &str) -> bool {
        let (reply_to, mut rx) = oneshot::channel();
        processor.handle(Command::CreateUser {
            user: NewUser::new(email, password, "Test"),
            reply_to,
        });
        rx.try_recv().unwrap().success
    }

    #[test]
    fn test_each_command_gets_one_reply() {
        let mut processor = RegistryProcessor::new(UserStore::new());

        assert!(create(&mut processor, "a@x.com", "p1"));
        assert!(!create(&mut processor, "a@x.com", "p1"));

        let (reply_to, mut rx) = oneshot::channel();
        processor.handle(Command::AuthenticateUser {
            credentials: Credentials::new("a@x.com", "p1"),
            reply_to,
        });
        assert_eq!(rx.try_recv().unwrap(), ActionResult { success: true });

        let (reply_to, mut rx) = oneshot::channel();
        processor.handle(Command::LookupUser {
            email: "a@x.com".to_string(),
            reply_to,
        });
        let user = rx.try_recv().unwrap().user.unwrap();
        assert_eq!(user.email, "a@x.com");

        assert_eq!(processor.processed(), 4);
    }

    #[test]
    fn test_reply_to_dropped_receiver_is_discarded() {
        let mut processor = RegistryProcessor::new(UserStore::new());

        let (reply_to, rx) = oneshot::channel();
        drop(rx);
        processor.handle(Command::CreateUser {
            user: NewUser::new("a@x.com", "p1", "A"),
            reply_to,
        });

        // The command was still applied and the processor keeps serving
        assert_eq!(processor.store().len(), 1);
        assert!(!create(&mut processor, "a@x.com", "p1"));
        assert!(create(&mut processor, "b@x.com", "p2"));
    }

    #[tokio::test]
    async fn test_run_processes_in_order_and_stops_when_senders_drop() {
        let (tx, rx) = mailbox::channel(MailboxPolicy::Unbounded);

        let mut replies = Vec::new();
        for password in ["first", "second", "third"] {
            let (reply_to, reply) = oneshot::channel();
            tx.submit(Command::CreateUser {
                user: NewUser::new("a@x.com", password, "A"),
                reply_to,
            })
            .unwrap();
            replies.push(reply);
        }
        drop(tx);

        let store = RegistryProcessor::new(UserStore::new()).spawn(rx).await.unwrap();

        let mut outcomes = Vec::new();
        for reply in replies {
            outcomes.push(reply.await.unwrap().success);
        }
        assert_eq!(outcomes, vec![true, false, false]);

        // The first command in arrival order won
        assert_eq!(store.lookup("a@x.com").unwrap().password, "first");
    }
}
