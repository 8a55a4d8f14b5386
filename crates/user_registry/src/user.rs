//! User records and operation payloads

use std::fmt;

use chrono::{DateTime, Utc};

/// A registered user.
///
/// Records are created by the store and never mutated afterwards. Callers only
/// ever receive clones.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Opaque unique identifier
    pub id: String,

    /// Email address, unique across the registry
    pub email: String,

    /// Plaintext password
    pub password: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// Display name
    pub name: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("name", &self.name)
            .finish()
    }
}

/// Payload for registering a new user
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl NewUser {
    /// Creates a new registration payload
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// A username/password pair presented for authentication.
///
/// The username is matched against the record's email.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Creates a new credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_passwords() {
        let record = UserRecord {
            id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
            created_at: Utc::now(),
            name: "A".to_string(),
        };
        let rendered = format!("{:?}", record);
        assert!(rendered.contains("a@x.com"));
        assert!(!rendered.contains("hunter2"));

        let new_user = NewUser::new("a@x.com", "hunter2", "A");
        assert!(!format!("{:?}", new_user).contains("hunter2"));

        let credentials = Credentials::new("a@x.com", "hunter2");
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
