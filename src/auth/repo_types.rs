use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::MemberError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "staff" => Ok(Role::Staff),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Row as stored in `users`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub identity: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct User {
    pub identity: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String, // argon2
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: r.role.parse()?,
            identity: r.identity,
            name: r.name,
            password_hash: r.password_hash,
        })
    }
}

/// The authenticated principal a request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub identity: String,
    pub name: String,
    pub role: Role,
}

impl Caller {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn require_owner(&self, action: &'static str) -> Result<(), MemberError> {
        if self.is_owner() {
            Ok(())
        } else {
            Err(MemberError::NotAuthorized { action })
        }
    }
}

impl From<&User> for Caller {
    fn from(u: &User) -> Self {
        Self {
            identity: u.identity.clone(),
            name: u.name.clone(),
            role: u.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!(" staff ".parse::<Role>().unwrap(), Role::Staff);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn only_owner_passes_owner_gate() {
        let owner = Caller {
            identity: "OWNER001".into(),
            name: "Owner".into(),
            role: Role::Owner,
        };
        let staff = Caller {
            role: Role::Staff,
            ..owner.clone()
        };
        assert!(owner.require_owner("delete members").is_ok());
        assert!(matches!(
            staff.require_owner("delete members"),
            Err(MemberError::NotAuthorized { action: "delete members" })
        ));
    }
}
