use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{User, UserFields, UserSummary};
use crate::error::{ApiError, ApiResult};

/// Persistence seam for the users collection. Every method is a single
/// atomic statement against the store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by (normalized) email, active or not.
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>>;

    /// Active users only, oldest first.
    async fn find_active(&self) -> ApiResult<Vec<UserSummary>>;

    /// Insert a new active user. A taken email is `ApiError::DuplicateEmail`.
    async fn insert(&self, fields: UserFields) -> ApiResult<User>;

    /// Replace nombre, email and digest. `None` if the id is unknown.
    async fn update_fields(&self, id: Uuid, fields: UserFields) -> ApiResult<Option<User>>;

    /// Set `estado = false`. `None` if the id is unknown.
    async fn deactivate(&self, id: Uuid) -> ApiResult<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 23505 on `users_email_key` is the only unique index on the table.
fn classify(e: sqlx::Error, email: &str) -> ApiError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return ApiError::DuplicateEmail(email.to_string());
        }
    }
    ApiError::Storage(e)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, email, password_hash, estado, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_active(&self) -> ApiResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, nombre, email
            FROM users
            WHERE estado
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, fields: UserFields) -> ApiResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (nombre, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, nombre, email, password_hash, estado, created_at, updated_at
            "#,
        )
        .bind(&fields.nombre)
        .bind(&fields.email)
        .bind(&fields.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, &fields.email))
    }

    async fn update_fields(&self, id: Uuid, fields: UserFields) -> ApiResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET nombre = $2, email = $3, password_hash = $4, updated_at = now()
             WHERE id = $1
            RETURNING id, nombre, email, password_hash, estado, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&fields.nombre)
        .bind(&fields.email)
        .bind(&fields.password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify(e, &fields.email))
    }

    async fn deactivate(&self, id: Uuid) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET estado = FALSE, updated_at = now()
             WHERE id = $1
            RETURNING id, nombre, email, password_hash, estado, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
