use serde::Serialize;
use sqlx::FromRow;

/// A persisted account. The password column holds the bcrypt secret and is
/// never serialized into a response.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
}

/// The six mutable fields, used for inserts and for full-row updates. The
/// password here is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
}

impl NewUser {
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
        }
    }
}
