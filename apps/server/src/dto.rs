//! Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use user_registry::{Credentials, NewUser, UserRecord};

/// Timestamp format of the `created` field
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        NewUser::new(request.email, request.password, request.name)
    }
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(request: LoginRequest) -> Self {
        Credentials::new(request.email, request.password)
    }
}

/// Empty JSON object (`{}`)
#[derive(Debug, Default, Serialize)]
pub struct EmptyResponse {}

/// Error body (`{"error": "<code>"}`)
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// A user as returned to clients. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    #[serde(serialize_with = "serialize_created")]
    pub created: DateTime<Utc>,
    pub name: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created: user.created_at,
            name: user.name,
        }
    }
}

fn serialize_created<S: Serializer>(
    created: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&created.format(CREATED_FORMAT))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_user_response_omits_password() {
        let record = UserRecord {
            id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            password: "p1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap(),
            name: "A".to_string(),
        };

        let json = serde_json::to_value(UserResponse::from(record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "user-1",
                "email": "a@x.com",
                "created": "2024-03-01 09:05:07",
                "name": "A",
            })
        );
    }

    #[test]
    fn test_empty_response_is_empty_object() {
        assert_eq!(serde_json::to_string(&EmptyResponse {}).unwrap(), "{}");
    }

    #[test]
    fn test_requests_deserialize() {
        let register: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"p1","name":"Миша"}"#).unwrap();
        let new_user = NewUser::from(register);
        assert_eq!(new_user.name, "Миша");

        let login: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"p1"}"#).unwrap();
        assert_eq!(Credentials::from(login), Credentials::new("a@x.com", "p1"));
    }
}
