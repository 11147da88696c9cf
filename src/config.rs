use anyhow::Context;
use serde::Deserialize;
use time::{macros::format_description, UtcOffset};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    /// No key means dry-run: messages are logged, nothing leaves the host.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub sender_id: String,
    pub language: String,
    pub route: String,
    pub timeout_secs: u64,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReminderConfig {
    pub min_days: i64,
    pub max_days: i64,
    pub reset_on_renew: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub identity: String,
    pub name: String,
    pub role: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub sms: SmsConfig,
    pub reminders: ReminderConfig,
    pub utc_offset: UtcOffset,
    pub seed_users: Vec<SeedUser>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn parse_utc_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid utc offset {raw:?}, expected e.g. +05:30"))
}

fn seed_user(prefix: &str, role: &str, identity: &str, name: &str) -> Option<SeedUser> {
    let password = std::env::var(format!("SEED_{prefix}_PASSWORD")).ok()?;
    Some(SeedUser {
        identity: env_or(&format!("SEED_{prefix}_IDENTITY"), identity),
        name: env_or(&format!("SEED_{prefix}_NAME"), name),
        role: role.to_string(),
        password,
    })
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_or("DATABASE_URL", "sqlite://members.db");
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: env_or("JWT_ISSUER", "memberdesk"),
            audience: env_or("JWT_AUDIENCE", "memberdesk-staff"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let sms = SmsConfig {
            api_key: std::env::var("SMS_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            endpoint: env_or("SMS_ENDPOINT", "https://www.fast2sms.com/dev/bulkV2"),
            sender_id: env_or("SMS_SENDER_ID", "FSTSMS"),
            language: env_or("SMS_LANGUAGE", "english"),
            route: env_or("SMS_ROUTE", "q"),
            timeout_secs: env_parse("SMS_TIMEOUT_SECS", 10),
            signature: env_or("ORG_SIGNATURE", "[YourOrg]"),
        };
        let reminders = ReminderConfig {
            min_days: env_parse("REMINDER_DAYS_MIN", 5),
            max_days: env_parse("REMINDER_DAYS_MAX", 10),
            reset_on_renew: env_parse("RESET_REMINDER_ON_RENEW", false),
        };
        anyhow::ensure!(
            reminders.min_days <= reminders.max_days,
            "REMINDER_DAYS_MIN ({}) must not exceed REMINDER_DAYS_MAX ({})",
            reminders.min_days,
            reminders.max_days
        );
        let utc_offset = parse_utc_offset(&env_or("APP_UTC_OFFSET", "+05:30"))?;

        let seed_users = [
            seed_user("OWNER", "owner", "OWNER001", "Owner"),
            seed_user("STAFF", "staff", "STAFF001", "Staff"),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self {
            database_url,
            jwt,
            sms,
            reminders,
            utc_offset,
            seed_users,
        })
    }
}
