//! In-memory user collection.
//!
//! The store has no concurrency control of its own. It is owned by the
//! [`RegistryProcessor`](crate::RegistryProcessor), which applies one
//! operation at a time.

use std::collections::{hash_map::Entry, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Credentials, NewUser, UserRecord};

/// Source of opaque user identifiers
pub trait IdGenerator: Send {
    /// Returns a fresh identifier, distinct from every previous one
    fn next_id(&mut self) -> String;
}

/// Source of creation timestamps
pub trait Clock: Send {
    /// Returns the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Wall clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The authoritative user collection, keyed by email.
pub struct UserStore {
    users: HashMap<String, UserRecord>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl UserStore {
    /// Creates an empty store with UUID identifiers and the system clock
    pub fn new() -> Self {
        Self::with_sources(UuidGenerator, SystemClock)
    }

    /// Creates an empty store with the given identity and time sources
    pub fn with_sources(ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            users: HashMap::new(),
            ids: Box::new(ids),
            clock: Box::new(clock),
        }
    }

    /// Registers a new user.
    ///
    /// Returns `None` if the email (exact, case-sensitive match) is taken.
    pub fn create(&mut self, new_user: NewUser) -> Option<UserRecord> {
        match self.users.entry(new_user.email) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: self.ids.next_id(),
                    email: slot.key().clone(),
                    password: new_user.password,
                    created_at: self.clock.now(),
                    name: new_user.name,
                };
                Some(slot.insert(record).clone())
            }
        }
    }

    /// Checks a username/password pair against the stored records.
    ///
    /// The username must equal a record's email and the password must equal
    /// its stored password, both byte for byte.
    pub fn authenticate(&self, credentials: &Credentials) -> bool {
        self.users
            .get(&credentials.username)
            .is_some_and(|user| user.password == credentials.password)
    }

    /// Finds the user registered under `email`
    pub fn lookup(&self, email: &str) -> Option<UserRecord> {
        self.users.get(email).cloned()
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if no user is registered
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}
