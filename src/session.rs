//! Mock identity. Components that need to know who is acting take a `Session`
//! argument; nothing reads a process-wide "current user".

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing {0}")]
    MissingField(&'static str),
}

struct SampleAccount {
    id: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: Role,
}

// Fixed ids so a sample user's saved charts survive between runs.
const SAMPLE_ACCOUNTS: &[SampleAccount] = &[
    SampleAccount {
        id: "sample-user",
        email: "user@example.com",
        password: "password123",
        name: "John Doe",
        role: Role::User,
    },
    SampleAccount {
        id: "sample-admin",
        email: "admin@example.com",
        password: "admin123",
        name: "Admin User",
        role: Role::Admin,
    },
];

/// Check the credentials against the built-in sample accounts.
pub fn login(email: &str, password: &str) -> Result<Session, AuthError> {
    let account = SAMPLE_ACCOUNTS
        .iter()
        .find(|a| a.email == email && a.password == password)
        .ok_or(AuthError::InvalidCredentials)?;

    tracing::debug!(email, "mock login");
    Ok(Session::new(User {
        id: account.id.to_string(),
        name: account.name.to_string(),
        email: account.email.to_string(),
        role: account.role,
    }))
}

/// Open a session for a new regular user. Nothing is stored.
pub fn register(name: &str, email: &str, password: &str) -> Result<Session, AuthError> {
    for (field, value) in [("name", name), ("email", email), ("password", password)] {
        if value.trim().is_empty() {
            return Err(AuthError::MissingField(field));
        }
    }
    Ok(Session::new(User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: Role::User,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_sample_accounts() {
        let user = login("user@example.com", "password123").unwrap();
        assert_eq!(user.user_id(), "sample-user");
        assert!(!user.is_admin());

        let admin = login("admin@example.com", "admin123").unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.user().name, "Admin User");
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        assert_eq!(
            login("user@example.com", "admin123"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_register() {
        let session = register("Ada", "ada@example.com", "secret").unwrap();
        assert_eq!(session.user().role, Role::User);
        assert!(!session.user_id().is_empty());
        assert_eq!(register("Ada", " ", "x"), Err(AuthError::MissingField("email")));
    }
}
