use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{PublicUser, UserListResponse};
use super::extractors::UserBody;
use super::services::{create_user, deactivate_user, list_users, update_user};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const BASE_PATH: &str = "/api/usuarios";

pub fn usuarios_routes() -> Router<AppState> {
    Router::new()
        .route(BASE_PATH, get(list).post(create))
        .route(&format!("{}/:id", BASE_PATH), put(update).delete(deactivate))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId(raw.to_string()))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    UserBody(payload): UserBody,
) -> ApiResult<(HeaderMap, Json<PublicUser>)> {
    let (id, user) = create_user(&state, &payload).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("{}/{}", BASE_PATH, id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((headers, Json(user)))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<UserListResponse>> {
    let usuarios = list_users(&state).await?;
    Ok(Json(UserListResponse { usuarios }))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    UserBody(payload): UserBody,
) -> ApiResult<Json<PublicUser>> {
    let id = parse_id(&id)?;
    Ok(Json(update_user(&state, id, &payload).await?))
}

#[instrument(skip(state))]
pub async fn deactivate(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let id = parse_id(&id)?;
    Ok(Json(deactivate_user(&state, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(matches!(parse_id("123"), Err(ApiError::InvalidId(raw)) if raw == "123"));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn public_user_serialization_has_no_password() {
        let json = serde_json::to_value(PublicUser {
            nombre: "Ana".into(),
            email: "ana@x.com".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "nombre": "Ana", "email": "ana@x.com" }));
    }
}
