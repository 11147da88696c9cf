use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::auth::repo_types::{User, UserRow};
use crate::config::SeedUser;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_identity(&self, identity: &str) -> anyhow::Result<Option<User>>;
    /// Inserts unless the identity exists; existing users are never touched.
    async fn insert_if_missing(&self, user: &User) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct SqliteUserStore {
    db: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_identity(&self, identity: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT identity, name, role, password_hash
            FROM users
            WHERE identity = ?
            "#,
        )
        .bind(identity)
        .fetch_optional(&self.db)
        .await
        .context("find user by identity")?;
        row.map(User::try_from).transpose()
    }

    async fn insert_if_missing(&self, user: &User) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (identity, name, role, password_hash)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.identity)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .execute(&self.db)
        .await
        .context("insert user")?;
        Ok(res.rows_affected() == 1)
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_identity(&self, identity: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(identity).cloned())
    }

    async fn insert_if_missing(&self, user: &User) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.identity) {
            return Ok(false);
        }
        users.insert(user.identity.clone(), user.clone());
        Ok(true)
    }
}

/// Creates the configured seed users that do not exist yet.
pub async fn seed_users(store: &dyn UserStore, seeds: &[SeedUser]) -> anyhow::Result<()> {
    if seeds.is_empty() {
        warn!("no SEED_*_PASSWORD set; no users seeded");
        return Ok(());
    }
    for seed in seeds {
        if store.find_by_identity(&seed.identity).await?.is_some() {
            continue;
        }
        let user = User {
            identity: seed.identity.clone(),
            name: seed.name.clone(),
            role: seed.role.parse()?,
            password_hash: hash_password(&seed.password)?,
        };
        if store.insert_if_missing(&user).await? {
            info!(identity = %user.identity, role = %user.role, "seeded user");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use crate::db;

    fn user(identity: &str, role: Role) -> User {
        User {
            identity: identity.into(),
            name: "Someone".into(),
            role,
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn sqlite_store_finds_inserted_user() {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        let store = SqliteUserStore::new(pool);

        assert!(store.insert_if_missing(&user("OWNER001", Role::Owner)).await.unwrap());
        let found = store.find_by_identity("OWNER001").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Owner);
        assert!(store.find_by_identity("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn existing_users_are_not_overwritten() {
        let store = InMemoryUserStore::default();
        assert!(store.insert_if_missing(&user("STAFF001", Role::Staff)).await.unwrap());
        assert!(!store.insert_if_missing(&user("STAFF001", Role::Owner)).await.unwrap());
        let found = store.find_by_identity("STAFF001").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Staff);
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = InMemoryUserStore::default();
        let seeds = vec![SeedUser {
            identity: "OWNER001".into(),
            name: "Owner".into(),
            role: "owner".into(),
            password: "correct-horse".into(),
        }];
        seed_users(&store, &seeds).await.unwrap();
        let first = store.find_by_identity("OWNER001").await.unwrap().unwrap();
        seed_users(&store, &seeds).await.unwrap();
        let second = store.find_by_identity("OWNER001").await.unwrap().unwrap();
        assert_eq!(first.password_hash, second.password_hash);
    }
}
