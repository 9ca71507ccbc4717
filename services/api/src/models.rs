//! API models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod catalog;
pub mod orders;
pub mod reviews;

/// Kind of account a user holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Seller,
    Buyer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Seller => "SELLER",
            AccountType::Buyer => "BUYER",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELLER" => Ok(AccountType::Seller),
            "BUYER" => Ok(AccountType::Buyer),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response for profile operations
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: AccountType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed partial update for the profile.
///
/// Only these fields are mutable over the API; anything else in the
/// payload is ignored by construction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: Option<AccountType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_round_trips_through_db_strings() {
        assert_eq!(AccountType::Seller.as_str(), "SELLER");
        assert_eq!("BUYER".parse::<AccountType>().unwrap(), AccountType::Buyer);
        assert!("ADMIN".parse::<AccountType>().is_err());
    }

    #[test]
    fn account_type_serializes_screaming() {
        let json = serde_json::to_string(&AccountType::Buyer).unwrap();
        assert_eq!(json, "\"BUYER\"");
    }
}
