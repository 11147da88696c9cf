use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{seed_users, InMemoryUserStore, SqliteUserStore, UserStore};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db;
use crate::members::{InMemoryMemberStore, MemberStore, SqliteMemberStore};
use crate::notify::{DryRunNotifier, Fast2SmsClient, Notifier};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub members: Arc<dyn MemberStore>,
    pub users: Arc<dyn UserStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (members, users): (Arc<dyn MemberStore>, Arc<dyn UserStore>) =
            if config.database_url == "memory" {
                warn!("DATABASE_URL=memory; members are lost on restart");
                (
                    Arc::new(InMemoryMemberStore::default()) as Arc<dyn MemberStore>,
                    Arc::new(InMemoryUserStore::default()) as Arc<dyn UserStore>,
                )
            } else {
                let pool = db::connect(&config.database_url).await?;
                (
                    Arc::new(SqliteMemberStore::new(pool.clone())) as Arc<dyn MemberStore>,
                    Arc::new(SqliteUserStore::new(pool)) as Arc<dyn UserStore>,
                )
            };

        seed_users(users.as_ref(), &config.seed_users).await?;

        let notifier: Arc<dyn Notifier> = match &config.sms.api_key {
            Some(key) => Arc::new(Fast2SmsClient::new(&config.sms, key.clone())?) as Arc<dyn Notifier>,
            None => {
                warn!("SMS_API_KEY not set; sms runs in dry-run mode");
                Arc::new(DryRunNotifier) as Arc<dyn Notifier>
            }
        };

        let clock = Arc::new(SystemClock::new(config.utc_offset));
        info!(
            offset = %config.utc_offset,
            min_days = config.reminders.min_days,
            max_days = config.reminders.max_days,
            "state initialised"
        );

        Ok(Self::from_parts(config, members, users, notifier, clock))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        members: Arc<dyn MemberStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            members,
            users,
            notifier,
            clock,
        }
    }
}
