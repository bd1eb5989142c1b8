use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request body for create and update, JSON or form encoded. Fields are kept
/// as raw values so a missing or non-string one reaches the validator instead
/// of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub nombre: Option<Value>,
    pub email: Option<Value>,
    pub password: Option<Value>,
}

/// Public part of the user echoed back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub nombre: String,
    pub email: String,
}

/// List entry; `_id` is what the update and delete routes take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub usuarios: Vec<UserListItem>,
}
