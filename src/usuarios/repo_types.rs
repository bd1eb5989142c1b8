use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{PublicUser, UserListItem};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // assigned by the store, never updated
    pub nombre: String,             // display name
    pub email: String,              // unique, stored lowercase
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub estado: bool,               // false once deactivated
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Projection returned by the active listing, no digest.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
}

/// Values written by insert and by a field update.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            nombre: u.nombre,
            email: u.email,
        }
    }
}

impl From<UserSummary> for UserListItem {
    fn from(s: UserSummary) -> Self {
        Self {
            id: s.id,
            nombre: s.nombre,
            email: s.email,
        }
    }
}
