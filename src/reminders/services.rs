use tracing::{debug, info, instrument};

use super::{ReminderOutcome, ReminderReport, ReminderWindow};
use crate::{
    error::MemberError,
    members::{dto::MemberView, services::list_members},
    notify::{dispatch, reminder_message},
    state::AppState,
};

pub fn is_due(view: &MemberView, window: ReminderWindow) -> bool {
    !view.member.reminder_sent && window.contains(view.days_left)
}

/// One evaluator pass over an already listed snapshot.
///
/// The latch is claimed in the store before the SMS goes out, so two overlapping
/// passes never both send. A failed send keeps the latch set and is not retried.
/// Views whose latch this pass claimed are updated in place.
#[instrument(skip_all, fields(members = views.len()))]
pub async fn run_pass(
    state: &AppState,
    views: &mut [MemberView],
) -> Result<ReminderReport, MemberError> {
    let window = ReminderWindow::from(state.config.reminders);
    let mut reminded = Vec::new();

    for view in views.iter_mut() {
        if !is_due(view, window) {
            continue;
        }
        if !state.members.claim_reminder(&view.member.name).await? {
            debug!(name = %view.member.name, "reminder already claimed elsewhere");
            continue;
        }
        view.member.reminder_sent = true;

        let message = reminder_message(
            &view.member.name,
            view.member.expiry_date,
            view.days_left,
            &state.config.sms.signature,
        );
        let delivery = dispatch(state.notifier.as_ref(), &view.member.phone, &message).await;
        info!(
            name = %view.member.name,
            days_left = view.days_left,
            sent = delivery.is_sent(),
            "reminder fired"
        );
        reminded.push(ReminderOutcome {
            name: view.member.name.clone(),
            phone: view.member.phone.clone(),
            days_left: view.days_left,
            delivery,
        });
    }

    Ok(ReminderReport {
        window,
        evaluated: views.len(),
        reminded,
    })
}

/// Lists every member and runs a pass, without returning the table.
pub async fn run_reminders(state: &AppState) -> Result<ReminderReport, MemberError> {
    let mut views = list_members(state).await?;
    run_pass(state, &mut views).await
}
