//! User model

use serde::{Deserialize, Serialize};

/// The account a device is signed in as.
///
/// Identity is issued externally (the JWT subject); the engine only needs
/// the id to scope records and the display fields for client UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier (the bearer token's subject)
    pub id: String,
    /// Display name
    pub username: String,
    /// Account email
    pub email: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serde_roundtrip() {
        let user = User {
            id: "user-1".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&user).unwrap();
        let parsed: User = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, user);
    }
}
