use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{PublicUser, UserListItem, UserPayload};
use super::repo_types::UserFields;
use super::validation::{validate_user, ValidUser};
use crate::{
    auth::password::hash_password,
    error::{ApiError, ApiResult},
    state::AppState,
};

fn digest(st: &AppState, valid: ValidUser) -> ApiResult<UserFields> {
    let password_hash =
        hash_password(&valid.password, &st.config.hashing).map_err(|e| ApiError::Hash(e.to_string()))?;
    Ok(UserFields {
        nombre: valid.nombre,
        email: valid.email,
        password_hash,
    })
}

/// Validate, reject a taken email, hash, insert. Returns the new id alongside
/// the public view.
pub async fn create_user(st: &AppState, payload: &UserPayload) -> ApiResult<(Uuid, PublicUser)> {
    let valid = validate_user(payload).map_err(|e| {
        warn!(error = %e, "create rejected by validation");
        e
    })?;

    if st.repo.find_by_email(&valid.email).await?.is_some() {
        warn!(email = %valid.email, "email already registered");
        return Err(ApiError::DuplicateEmail(valid.email));
    }

    // the unique index still catches a concurrent insert that slips past the check
    let fields = digest(st, valid)?;
    let user = st.repo.insert(fields).await?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((user.id, user.into()))
}

pub async fn list_users(st: &AppState) -> ApiResult<Vec<UserListItem>> {
    let rows = st.repo.find_active().await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Full replacement of nombre, email and password; all three are required.
pub async fn update_user(st: &AppState, id: Uuid, payload: &UserPayload) -> ApiResult<PublicUser> {
    let valid = validate_user(payload).map_err(|e| {
        warn!(user_id = %id, error = %e, "update rejected by validation");
        e
    })?;

    let fields = digest(st, valid)?;
    let user = st
        .repo
        .update_fields(id, fields)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    info!(user_id = %user.id, "user updated");
    Ok(user.into())
}

/// Soft delete. Deactivating an inactive user returns the same shape again.
pub async fn deactivate_user(st: &AppState, id: Uuid) -> ApiResult<PublicUser> {
    let user = st
        .repo
        .deactivate(id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    info!(user_id = %user.id, "user deactivated");
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::usuarios::memory::InMemoryUserRepository;
    use std::sync::Arc;

    fn payload(nombre: &str, email: &str, password: &str) -> UserPayload {
        UserPayload {
            nombre: Some(nombre.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn setup() -> (AppState, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (AppState::fake_with(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_stores_digest_and_echoes_public_fields() {
        let (st, repo) = setup();
        let (id, public) = create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(
            public,
            PublicUser {
                nombre: "Ana".into(),
                email: "ana@x.com".into()
            }
        );
        let stored = repo.get(id).await.unwrap();
        assert!(stored.estado);
        assert_ne!(stored.password_hash, "secret123");
        assert!(verify_password("secret123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn create_with_taken_email_is_duplicate_and_inserts_nothing() {
        let (st, repo) = setup();
        create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap();
        let err = create_user(&st, &payload("Ana Dos", "ANA@x.com", "secret456"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail(ref e) if e == "ana@x.com"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_email_insert_once() {
        let (st, repo) = setup();
        let first = payload("Ana", "ana@x.com", "secret123");
        let second = payload("Ana Bis", "ana@x.com", "secret456");

        let (a, b) = tokio::join!(create_user(&st, &first), create_user(&st, &second));

        let duplicates = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(ApiError::DuplicateEmail(_))))
            .count();
        assert_eq!(duplicates, 1);
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn create_with_missing_field_never_touches_store() {
        let (st, repo) = setup();
        // a down store would surface as Storage if it were reached
        repo.set_unavailable(true);
        let err = create_user(
            &st,
            &UserPayload {
                nombre: Some("Ana".into()),
                email: None,
                password: Some("secret123".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn create_surfaces_storage_error() {
        let (st, repo) = setup();
        repo.set_unavailable(true);
        let err = create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }

    #[tokio::test]
    async fn list_only_returns_active_users() {
        let (st, _repo) = setup();
        let (ana, _) = create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap();
        let (bea, _) = create_user(&st, &payload("Bea", "bea@x.com", "secret123"))
            .await
            .unwrap();
        deactivate_user(&st, ana).await.unwrap();

        let listed = list_users(&st).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, bea);
        assert_eq!(listed[0].nombre, "Bea");
    }

    #[tokio::test]
    async fn update_replaces_fields_and_rehashes() {
        let (st, repo) = setup();
        let (id, _) = create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap();
        let public = update_user(&st, id, &payload("Ana Maria", "anam@x.com", "newsecret1"))
            .await
            .unwrap();
        assert_eq!(public.nombre, "Ana Maria");
        assert_eq!(public.email, "anam@x.com");

        let stored = repo.get(id).await.unwrap();
        assert_eq!(stored.id, id);
        assert!(verify_password("newsecret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_with_empty_password_leaves_record_untouched() {
        let (st, repo) = setup();
        let (id, _) = create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap();
        let before = repo.get(id).await.unwrap();

        let err = update_user(&st, id, &payload("Ana Maria", "ana@x.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let after = repo.get(id).await.unwrap();
        assert_eq!(after.nombre, before.nombre);
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (st, _repo) = setup();
        let id = Uuid::new_v4();
        let err = update_user(&st, id, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn deactivate_twice_keeps_shape() {
        let (st, repo) = setup();
        let (id, created) = create_user(&st, &payload("Ana", "ana@x.com", "secret123"))
            .await
            .unwrap();
        let first = deactivate_user(&st, id).await.unwrap();
        let second = deactivate_user(&st, id).await.unwrap();
        assert_eq!(first, created);
        assert_eq!(first, second);
        assert!(!repo.get(id).await.unwrap().estado);
    }

    #[tokio::test]
    async fn deactivate_unknown_id_is_not_found() {
        let (st, _repo) = setup();
        let err = deactivate_user(&st, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
