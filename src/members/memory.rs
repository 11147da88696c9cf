use std::collections::BTreeMap;

use async_trait::async_trait;
use time::Date;
use tokio::sync::Mutex;

use super::repo::MemberStore;
use super::repo_types::{Member, NewMember};
use crate::error::MemberError;

/// Process-local backend, selected with `DATABASE_URL=memory`. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryMemberStore {
    members: Mutex<BTreeMap<String, Member>>,
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn insert(&self, member: NewMember) -> Result<Member, MemberError> {
        let mut members = self.members.lock().await;
        let clash = members.contains_key(&member.name)
            || members.values().any(|m| m.phone == member.phone);
        if clash {
            return Err(MemberError::Duplicate);
        }
        let member = Member::from(member);
        members.insert(member.name.clone(), member.clone());
        Ok(member)
    }

    async fn list(&self) -> Result<Vec<Member>, MemberError> {
        let mut all: Vec<Member> = self.members.lock().await.values().cloned().collect();
        // BTreeMap already yields name order; a stable sort keeps it within equal dates
        all.sort_by_key(|m| m.expiry_date);
        Ok(all)
    }

    async fn exists(&self, name: &str, phone: &str) -> Result<bool, MemberError> {
        let members = self.members.lock().await;
        Ok(members.contains_key(name) || members.values().any(|m| m.phone == phone))
    }

    async fn delete(&self, name: &str) -> Result<bool, MemberError> {
        Ok(self.members.lock().await.remove(name).is_some())
    }

    async fn update_plan(&self, name: &str, plan: &str) -> Result<bool, MemberError> {
        let mut members = self.members.lock().await;
        Ok(match members.get_mut(name) {
            Some(m) => {
                m.plan = plan.to_string();
                true
            }
            None => false,
        })
    }

    async fn renew(
        &self,
        name: &str,
        expiry: Date,
        reset_reminder: bool,
    ) -> Result<bool, MemberError> {
        let mut members = self.members.lock().await;
        Ok(match members.get_mut(name) {
            Some(m) => {
                m.expiry_date = expiry;
                if reset_reminder {
                    m.reminder_sent = false;
                }
                true
            }
            None => false,
        })
    }

    async fn claim_reminder(&self, name: &str) -> Result<bool, MemberError> {
        let mut members = self.members.lock().await;
        Ok(match members.get_mut(name) {
            Some(m) if !m.reminder_sent => {
                m.reminder_sent = true;
                true
            }
            _ => false,
        })
    }
}
