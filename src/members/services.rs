use lazy_static::lazy_static;
use regex::Regex;
use time::Date;
use tracing::{info, instrument, warn};

use super::dto::{AddMemberRequest, AddedMember, MemberView, WriteOutcome};
use super::repo_types::NewMember;
use crate::{
    auth::Caller,
    error::MemberError,
    notify::{dispatch, welcome_message},
    state::AppState,
};

/// Strips spaces and dashes and checks for 7 to 15 digits with an optional leading `+`.
pub(crate) fn normalize_phone(raw: &str) -> Option<String> {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
    }
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    PHONE_RE.is_match(&compact).then_some(compact)
}

fn ensure_not_past(expiry: Date, today: Date) -> Result<(), MemberError> {
    if expiry < today {
        return Err(MemberError::InvalidDate { expiry, today });
    }
    Ok(())
}

/// Validates, inserts and sends the welcome SMS. A failed SMS does not undo the insert.
#[instrument(skip(state, input), fields(name = %input.name, by = %creator.identity))]
pub async fn add_member(
    state: &AppState,
    input: AddMemberRequest,
    creator: &Caller,
) -> Result<AddedMember, MemberError> {
    let name = input.name.trim();
    if name.is_empty() || input.phone.trim().is_empty() {
        return Err(MemberError::Validation("name and phone are required".into()));
    }
    let phone = normalize_phone(&input.phone)
        .ok_or_else(|| MemberError::Validation(format!("invalid phone number {:?}", input.phone)))?;

    // early so a duplicate is reported ahead of a past date; insert's constraint settles races
    if state.members.exists(name, &phone).await? {
        return Err(MemberError::Duplicate);
    }

    let now = state.clock.now();
    let today = now.date();
    ensure_not_past(input.expiry_date, today)?;

    let member = state
        .members
        .insert(NewMember {
            name: name.to_string(),
            phone,
            plan: input.plan.trim().to_string(),
            expiry_date: input.expiry_date,
            added_by_name: creator.name.clone(),
            added_by_identity: creator.identity.clone(),
            created_at: now,
        })
        .await?;
    info!(name = %member.name, expiry = %member.expiry_date, "member added");

    let message = welcome_message(&member.name, member.expiry_date, &state.config.sms.signature);
    let welcome = dispatch(state.notifier.as_ref(), &member.phone, &message).await;

    Ok(AddedMember {
        member: MemberView::new(member, today),
        welcome,
    })
}

/// All members by ascending expiry with `days_left` computed against today.
pub async fn list_members(state: &AppState) -> Result<Vec<MemberView>, MemberError> {
    let today = state.clock.today();
    let members = state.members.list().await?;
    Ok(members
        .into_iter()
        .map(|m| MemberView::new(m, today))
        .collect())
}

#[instrument(skip(state), fields(by = %caller.identity))]
pub async fn delete_member(
    state: &AppState,
    name: &str,
    caller: &Caller,
) -> Result<WriteOutcome, MemberError> {
    caller.require_owner("delete members")?;
    let name = name.trim();
    let matched = state.members.delete(name).await?;
    if matched {
        info!(%name, "member deleted");
    } else {
        warn!(%name, "delete of unknown member ignored");
    }
    Ok(WriteOutcome::new(name, matched))
}

#[instrument(skip(state), fields(by = %caller.identity))]
pub async fn update_plan(
    state: &AppState,
    name: &str,
    plan: &str,
    caller: &Caller,
) -> Result<WriteOutcome, MemberError> {
    caller.require_owner("update plans")?;
    let name = name.trim();
    let matched = state.members.update_plan(name, plan.trim()).await?;
    if matched {
        info!(%name, plan = %plan.trim(), "plan updated");
    } else {
        warn!(%name, "plan update for unknown member ignored");
    }
    Ok(WriteOutcome::new(name, matched))
}

/// Moves the expiry date. The reminder latch is kept unless `RESET_REMINDER_ON_RENEW` is set.
#[instrument(skip(state), fields(by = %caller.identity))]
pub async fn renew_member(
    state: &AppState,
    name: &str,
    expiry: Date,
    caller: &Caller,
) -> Result<WriteOutcome, MemberError> {
    caller.require_owner("renew members")?;
    let name = name.trim();
    ensure_not_past(expiry, state.clock.today())?;
    let reset = state.config.reminders.reset_on_renew;
    let matched = state.members.renew(name, expiry, reset).await?;
    if matched {
        info!(%name, %expiry, reset_reminder = reset, "member renewed");
    } else {
        warn!(%name, "renewal for unknown member ignored");
    }
    Ok(WriteOutcome::new(name, matched))
}
