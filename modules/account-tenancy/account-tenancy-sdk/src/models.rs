//! Domain models for the account tenancy module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an account (tenant).
pub type AccountId = Uuid;

/// Identifier of a user supplied by the identity provider.
pub type UserId = Uuid;

/// Maximum length of an account display name.
pub const ACCOUNT_NAME_MAX_LEN: usize = 255;

/// A tenant account.
///
/// This is also the shape of the per-session cache entry, which is why it is
/// serializable: the session holds a denormalized snapshot of the selected
/// account, never the authoritative record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub is_active: bool,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    /// Last time this account became the current account of some session.
    pub accessed: Option<DateTime<Utc>>,
}

/// Data for creating a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
}

impl NewAccount {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Checks the name against the account naming rules.
    ///
    /// # Errors
    /// Returns a human-readable message when the name is blank or longer than
    /// [`ACCOUNT_NAME_MAX_LEN`] characters.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("must not be empty".to_owned());
        }
        if self.name.chars().count() > ACCOUNT_NAME_MAX_LEN {
            return Err(format!("exceeds maximum length of {ACCOUNT_NAME_MAX_LEN}"));
        }
        Ok(())
    }
}
