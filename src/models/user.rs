//! Signed-in user profile.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Profile of a user authenticated by an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-issued identifier; scopes the transaction collection.
    pub id: UserId,
    /// Given name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_stored_user() {
        let json = r#"{
            "id": "117264829374",
            "name": "Ana",
            "email": "ana@example.com",
            "photo": "https://example.com/ana.png"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::from("117264829374"));
        assert_eq!(user.photo.as_deref(), Some("https://example.com/ana.png"));
    }

    #[test]
    fn photo_is_optional() {
        let json = r#"{"id": "1", "name": "Bruno", "email": "b@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.photo.is_none());
        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("photo").is_none());
    }
}
