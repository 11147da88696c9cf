pub mod handlers;
pub mod services;

use serde::Serialize;

use crate::config::ReminderConfig;
use crate::notify::Delivery;
use crate::state::AppState;
use axum::Router;

/// Inclusive range of `days_left` during which one reminder is owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderWindow {
    pub min_days: i64,
    pub max_days: i64,
}

impl ReminderWindow {
    pub fn contains(&self, days_left: i64) -> bool {
        (self.min_days..=self.max_days).contains(&days_left)
    }
}

impl From<ReminderConfig> for ReminderWindow {
    fn from(cfg: ReminderConfig) -> Self {
        Self {
            min_days: cfg.min_days,
            max_days: cfg.max_days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderOutcome {
    pub name: String,
    pub phone: String,
    pub days_left: i64,
    pub delivery: Delivery,
}

/// What one evaluator pass did.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderReport {
    pub window: ReminderWindow,
    pub evaluated: usize,
    pub reminded: Vec<ReminderOutcome>,
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let w = ReminderWindow {
            min_days: 5,
            max_days: 10,
        };
        assert!(!w.contains(4));
        assert!(w.contains(5));
        assert!(w.contains(7));
        assert!(w.contains(10));
        assert!(!w.contains(11));
        assert!(!w.contains(-1));
    }
}
