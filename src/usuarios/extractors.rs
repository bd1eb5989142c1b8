use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use tracing::warn;

use super::dto::UserPayload;
use crate::error::ApiError;

/// Create/update body. `application/x-www-form-urlencoded` is read as a form,
/// anything else as JSON.
pub struct UserBody(pub UserPayload);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for UserBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let payload = if is_form(&req) {
            Form::<UserPayload>::from_request(req, state)
                .await
                .map(|Form(p)| p)
                .map_err(|rejection| {
                    warn!(error = %rejection, "unreadable form body");
                    ApiError::BadRequest(rejection.body_text())
                })?
        } else {
            Json::<UserPayload>::from_request(req, state)
                .await
                .map(|Json(p)| p)
                .map_err(|rejection| {
                    warn!(error = %rejection, "unreadable json body");
                    ApiError::BadRequest(rejection.body_text())
                })?
        };
        Ok(UserBody(payload))
    }
}
