//! User account entity.

use chrono::{DateTime, Utc};

/// A registered user.
///
/// `password_hash` is `None` for accounts created through OAuth; such users can
/// only sign in through the session flow.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub password_hash: Option<String>,
}
