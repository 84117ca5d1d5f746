use serde::{Deserialize, Serialize};

/// Request body for create and update. Missing id and stats fall back to
/// zero, so a create body only needs name, email and password.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub wins: i32,
    #[serde(default)]
    pub losses: i32,
    #[serde(default)]
    pub draws: i32,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// One-field status/error envelope returned on every failure path.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_id_and_stats_to_zero() {
        let payload: UserPayload = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"pw1"}"#,
        )
        .unwrap();

        assert_eq!(payload.id, 0);
        assert_eq!(payload.wins, 0);
        assert_eq!(payload.losses, 0);
        assert_eq!(payload.draws, 0);
    }

    #[test]
    fn payload_requires_credentials() {
        let missing_password = serde_json::from_str::<UserPayload>(
            r#"{"name":"A","email":"a@x.com"}"#,
        );
        assert!(missing_password.is_err());
    }
}
