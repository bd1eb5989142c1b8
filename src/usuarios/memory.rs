use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::UserRepository;
use super::repo_types::{User, UserFields, UserSummary};
use crate::error::{ApiError, ApiResult};

/// In-memory users collection for tests and local runs. Enforces the same
/// unique-email rule as the PostgreSQL index.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the store were unreachable.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    fn check(&self) -> ApiResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::Storage(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        self.check()?;
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_active(&self) -> ApiResult<Vec<UserSummary>> {
        self.check()?;
        let users = self.users.read().await;
        let mut active: Vec<&User> = users.values().filter(|u| u.estado).collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(active
            .into_iter()
            .map(|u| UserSummary {
                id: u.id,
                nombre: u.nombre.clone(),
                email: u.email.clone(),
            })
            .collect())
    }

    async fn insert(&self, fields: UserFields) -> ApiResult<User> {
        self.check()?;
        // single write lock: check and insert cannot interleave
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == fields.email) {
            return Err(ApiError::DuplicateEmail(fields.email));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            nombre: fields.nombre,
            email: fields.email,
            password_hash: fields.password_hash,
            estado: true,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_fields(&self, id: Uuid, fields: UserFields) -> ApiResult<Option<User>> {
        self.check()?;
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Ok(None);
        }
        if users.values().any(|u| u.id != id && u.email == fields.email) {
            return Err(ApiError::DuplicateEmail(fields.email));
        }
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.nombre = fields.nombre;
        user.email = fields.email;
        user.password_hash = fields.password_hash;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn deactivate(&self, id: Uuid) -> ApiResult<Option<User>> {
        self.check()?;
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.estado = false;
            user.updated_at = OffsetDateTime::now_utc();
            user.clone()
        }))
    }
}
