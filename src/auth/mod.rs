use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use jwt::{AuthUser, JwtKeys};
pub use repo::{seed_users, InMemoryUserStore, SqliteUserStore, UserStore};
pub use repo_types::{Caller, Role, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
