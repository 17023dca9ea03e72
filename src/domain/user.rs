use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// A registered account holder. Users are immutable after registration;
/// only the credential material could rotate, and that happens outside
/// the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique across the directory
    pub email: String,
    /// Argon2id hash of the password, never the password itself
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_gets_fresh_id() {
        let a = User::new("Ada", "ada@example.com", "hash");
        let b = User::new("Ada", "ada@example.com", "hash");
        assert_ne!(a.id, b.id);
        assert_eq!(a.email, "ada@example.com");
    }
}
