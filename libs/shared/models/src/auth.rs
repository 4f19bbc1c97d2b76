use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInPayload {
    pub data: Option<UserEnvelope>,
}

/// Signed-in session as stored by the login flow: `{ "user": { "data": { "user": {..} } } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<SignInPayload>,
}

impl AuthState {
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(SignInPayload {
                data: Some(UserEnvelope { user: Some(user) }),
            }),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()?.data.as_ref()?.user.as_ref()
    }

    /// Opaque identifier of the signed-in user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.current_user()
            .map(|user| user.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_id_from_nested_payload() {
        let state: AuthState = serde_json::from_value(json!({
            "user": {
                "data": {
                    "user": { "id": "doc-42", "email": "doc@clinic.vn", "role": "doctor" }
                }
            }
        }))
        .unwrap();

        assert_eq!(state.user_id(), Some("doc-42"));
        assert_eq!(state.current_user().unwrap().role.as_deref(), Some("doctor"));
    }

    #[test]
    fn test_missing_user_yields_none() {
        assert_eq!(AuthState::default().user_id(), None);

        let partial: AuthState =
            serde_json::from_value(json!({ "user": { "data": null } })).unwrap();
        assert_eq!(partial.user_id(), None);
    }
}
