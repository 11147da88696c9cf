pub mod dto;
pub mod handlers;
mod memory;
mod repo;
mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use memory::InMemoryMemberStore;
pub use repo::{MemberStore, SqliteMemberStore};
pub use repo_types::{Member, NewMember};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::owner_routes())
}
