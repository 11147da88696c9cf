use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, OffsetDateTime};

use super::repo_types::Member;
use crate::notify::Delivery;
use crate::reminders::ReminderReport;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub plan: String,
    pub expiry_date: Date,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub plan: String,
}

#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    pub expiry_date: Date,
}

/// A member as shown in the table; `days_left` is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub member: Member,
    pub days_left: i64,
    pub created_time: String,
}

impl MemberView {
    pub fn new(member: Member, today: Date) -> Self {
        Self {
            days_left: member.days_left(today),
            created_time: format_created(member.created_at),
            member,
        }
    }
}

/// `15-Oct-2026 10:00 AM`, in the offset the timestamp was recorded with.
fn format_created(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[day]-[month repr:short]-[year] [hour repr:12]:[minute] [period]"
    ))
    .unwrap_or_else(|_| at.to_string())
}

#[derive(Debug, Serialize)]
pub struct AddedMember {
    pub member: MemberView,
    pub welcome: Delivery,
}

/// Result of an owner write; `matched == false` means the name did not exist.
#[derive(Debug, Serialize)]
pub struct WriteOutcome {
    pub name: String,
    pub matched: bool,
}

impl WriteOutcome {
    pub fn new(name: &str, matched: bool) -> Self {
        Self {
            name: name.to_string(),
            matched,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub today: Date,
    pub members: Vec<MemberView>,
    pub reminders: ReminderReport,
}
