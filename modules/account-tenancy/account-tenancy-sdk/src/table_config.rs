//! Per-table tenancy configuration.

use serde::{Deserialize, Serialize};

use crate::error::TenancyError;
use crate::field_path::AccountFieldPath;

/// Default `account_field`: an `account_id` column on the table itself.
pub const DEFAULT_ACCOUNT_FIELD: &str = "account_id";

/// Configuration attached to one tenant-owned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableTenancyConfig {
    /// Where the account identifier lives.
    ///
    /// - `account_id`: column on this table
    /// - `Users.account_id`: column on the table reached through the `Users` association
    /// - `Orders.Users.account_id`: deeper chains are allowed for reads
    pub account_field: String,

    /// Fill the account column (or the foreign key of a directly associated
    /// account-owning row) on save when the entity does not carry it.
    ///
    /// Only applies when the account is on this table or one association
    /// away; deeper chains are left untouched.
    pub auto_link_direct: bool,
}

impl Default for TableTenancyConfig {
    fn default() -> Self {
        Self {
            account_field: DEFAULT_ACCOUNT_FIELD.to_owned(),
            auto_link_direct: false,
        }
    }
}

impl TableTenancyConfig {
    #[must_use]
    pub fn with_account_field(account_field: impl Into<String>) -> Self {
        Self {
            account_field: account_field.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn auto_link(mut self, enabled: bool) -> Self {
        self.auto_link_direct = enabled;
        self
    }

    /// Parse `account_field` relative to `current_table`.
    ///
    /// # Errors
    /// Returns [`TenancyError::InvalidFieldPath`] when `account_field` is malformed.
    pub fn field_path(&self, current_table: &str) -> Result<AccountFieldPath, TenancyError> {
        AccountFieldPath::parse(&self.account_field, current_table)
    }

    /// Check `account_field` without binding it to a table.
    ///
    /// # Errors
    /// Returns [`TenancyError::InvalidFieldPath`] when `account_field` is malformed.
    pub fn validate(&self) -> Result<(), TenancyError> {
        self.field_path("").map(|_| ())
    }
}
