use async_trait::async_trait;
use sqlx::SqlitePool;
use time::Date;
use tracing::debug;

use super::repo_types::{Member, NewMember};
use crate::error::MemberError;

/// Persistence for members. Every write is a single statement.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Fails with `Duplicate` if the name or the phone is taken.
    async fn insert(&self, member: NewMember) -> Result<Member, MemberError>;
    /// All members, ascending by expiry date then name.
    async fn list(&self) -> Result<Vec<Member>, MemberError>;
    /// Whether any member already has this name or this phone.
    async fn exists(&self, name: &str, phone: &str) -> Result<bool, MemberError>;
    /// Returns whether a row was removed.
    async fn delete(&self, name: &str) -> Result<bool, MemberError>;
    /// Returns whether a row matched.
    async fn update_plan(&self, name: &str, plan: &str) -> Result<bool, MemberError>;
    /// Returns whether a row matched.
    async fn renew(&self, name: &str, expiry: Date, reset_reminder: bool)
        -> Result<bool, MemberError>;
    /// Flips `reminder_sent` false -> true. `true` only for the caller that flipped it.
    async fn claim_reminder(&self, name: &str) -> Result<bool, MemberError>;
}

#[derive(Clone)]
pub struct SqliteMemberStore {
    db: SqlitePool,
}

impl SqliteMemberStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn map_unique(e: sqlx::Error) -> MemberError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => MemberError::Duplicate,
        _ => MemberError::Storage(e),
    }
}

#[async_trait]
impl MemberStore for SqliteMemberStore {
    async fn insert(&self, member: NewMember) -> Result<Member, MemberError> {
        // one statement; the UNIQUE constraints on name and phone decide duplicates
        sqlx::query(
            r#"
            INSERT INTO members
                (name, phone, plan, expiry_date, added_by_name, added_by_identity, created_at, reminder_sent)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&member.name)
        .bind(&member.phone)
        .bind(&member.plan)
        .bind(member.expiry_date)
        .bind(&member.added_by_name)
        .bind(&member.added_by_identity)
        .bind(member.created_at)
        .execute(&self.db)
        .await
        .map_err(map_unique)?;

        debug!(name = %member.name, "member row inserted");
        Ok(member.into())
    }

    async fn list(&self) -> Result<Vec<Member>, MemberError> {
        let rows = sqlx::query_as::<_, Member>(
            r#"
            SELECT name, phone, plan, expiry_date, added_by_name, added_by_identity,
                   created_at, reminder_sent
            FROM members
            ORDER BY expiry_date ASC, name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn exists(&self, name: &str, phone: &str) -> Result<bool, MemberError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM members WHERE name = ? OR phone = ?")
                .bind(name)
                .bind(phone)
                .fetch_one(&self.db)
                .await?;
        Ok(count > 0)
    }

    async fn delete(&self, name: &str) -> Result<bool, MemberError> {
        let res = sqlx::query("DELETE FROM members WHERE name = ?")
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_plan(&self, name: &str, plan: &str) -> Result<bool, MemberError> {
        let res = sqlx::query("UPDATE members SET plan = ? WHERE name = ?")
            .bind(plan)
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn renew(
        &self,
        name: &str,
        expiry: Date,
        reset_reminder: bool,
    ) -> Result<bool, MemberError> {
        let res = sqlx::query(
            r#"
            UPDATE members
            SET expiry_date = ?,
                reminder_sent = CASE WHEN ? THEN 0 ELSE reminder_sent END
            WHERE name = ?
            "#,
        )
        .bind(expiry)
        .bind(reset_reminder)
        .bind(name)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn claim_reminder(&self, name: &str) -> Result<bool, MemberError> {
        let res = sqlx::query(
            "UPDATE members SET reminder_sent = 1 WHERE name = ? AND reminder_sent = 0",
        )
        .bind(name)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
