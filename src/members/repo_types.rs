use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Member row in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Member {
    pub name: String, // primary key
    pub phone: String,
    pub plan: String,
    pub expiry_date: Date,
    pub added_by_name: String,
    pub added_by_identity: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub reminder_sent: bool,
}

impl Member {
    /// Whole days from `today` until expiry; negative once expired.
    pub fn days_left(&self, today: Date) -> i64 {
        (self.expiry_date - today).whole_days()
    }
}

/// A validated member ready for insertion. Always starts with the reminder latch open.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
    pub plan: String,
    pub expiry_date: Date,
    pub added_by_name: String,
    pub added_by_identity: String,
    pub created_at: OffsetDateTime,
}

impl From<NewMember> for Member {
    fn from(n: NewMember) -> Self {
        Self {
            name: n.name,
            phone: n.phone,
            plan: n.plan,
            expiry_date: n.expiry_date,
            added_by_name: n.added_by_name,
            added_by_identity: n.added_by_identity,
            created_at: n.created_at,
            reminder_sent: false,
        }
    }
}
