pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub use memory::InMemoryUserRepository;
pub use repo::{PgUserRepository, UserRepository};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::usuarios_routes())
}
