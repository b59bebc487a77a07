//! Data models shared across the session subsystem.
//!
//! These are the portal-facing types: the authenticated user profile and
//! the request payloads for the signin/signup endpoints. Wire-level
//! response types live next to the API client in `api`.

use serde::{Deserialize, Serialize};

/// Authenticated user profile as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Portal role: "customer", "pharmacy_vendor", or "admin".
    #[serde(default)]
    pub role: Option<String>,
}

/// Payload for `POST /auth/signin`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_profile_parses_without_role() {
        let json = r#"{"id":"u-17","name":"Ayesha Rahman","email":"ayesha@example.com"}"#;
        let user: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert_eq!(user.id, "u-17");
        assert_eq!(user.role, None);
    }

    #[test]
    fn signup_request_omits_missing_role() {
        let request = SignupRequest {
            name: "Ayesha Rahman".to_string(),
            email: "ayesha@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            role: None,
        };
        let json = serde_json::to_string(&request).expect("request should serialize");
        assert!(!json.contains("role"));
    }
}
