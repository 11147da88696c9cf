use time::{macros::format_description, Date};

/// `22-Oct-2026`
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[day]-[month repr:short]-[year]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn welcome_message(name: &str, expiry: Date, signature: &str) -> String {
    format!(
        "🎉 Hi {name}, your membership is active till {}. - {signature}",
        format_date(expiry)
    )
}

pub fn reminder_message(name: &str, expiry: Date, days_left: i64, signature: &str) -> String {
    format!(
        "⚠️ Hi {name}, your membership expires on {} ({days_left} days left). Renew now! - {signature}",
        format_date(expiry)
    )
}
