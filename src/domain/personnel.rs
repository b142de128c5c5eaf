use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::id::RecordId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonnelRole {
    #[default]
    Delivery,
    Admin,
}

impl PersonnelRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonnelRole::Delivery => "Delivery",
            PersonnelRole::Admin => "Admin",
        }
    }
}

impl FromStr for PersonnelRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delivery" => Ok(PersonnelRole::Delivery),
            "Admin" => Ok(PersonnelRole::Admin),
            other => Err(DomainError::invalid(format!("{} is an invalid personnel role", other))),
        }
    }
}

impl fmt::Display for PersonnelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryPersonnel {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub contact_details: Option<String>,
    pub vehicle_type: Option<String>,
    pub is_available: bool,
    pub token_version: i32,
    pub role: PersonnelRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload as received; every field is checked by the service.
#[derive(Debug, Clone, Default)]
pub struct RegisterPersonnel {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_details: Option<String>,
    pub vehicle_type: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPersonnel {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub contact_details: String,
    pub vehicle_type: String,
    pub role: PersonnelRole,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub personnel: DeliveryPersonnel,
    pub token: String,
}

/// Which account table a token's subject lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Personnel,
    User,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Personnel => "personnel",
            TokenScope::User => "user",
        }
    }
}

impl FromStr for TokenScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personnel" => Ok(TokenScope::Personnel),
            "user" => Ok(TokenScope::User),
            other => Err(DomainError::Unauthorized(format!("unknown token scope '{}'", other))),
        }
    }
}

/// What an issued credential asserts once verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub scope: TokenScope,
    pub subject: RecordId,
    pub token_version: i32,
}
