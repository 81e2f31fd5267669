//! Error types for the account tenancy module.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when resolving, selecting or enforcing the active account.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenancyError {
    /// Resolution was attempted without an authenticated caller.
    #[error("no identity available, log in first")]
    NoIdentity,

    /// The caller has no account membership that could be selected.
    #[error("no account selectable for user {user_id}")]
    NoAccountSelectable { user_id: Uuid },

    /// Explicit selection of an account the caller is not a member of.
    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: Uuid },

    /// A read against a tenant-owned table without a determinable account.
    #[error("account required but not selected (table '{table}')")]
    AccountRequired { table: String },

    /// The configured account field cannot be parsed.
    #[error("invalid account field '{field}': {reason}")]
    InvalidFieldPath { field: String, reason: String },

    /// An association named in an account field is not declared.
    #[error("unknown association '{association}' on table '{table}'")]
    UnknownAssociation { table: String, association: String },

    #[error("validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    /// Storage or other unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TenancyError {
    #[must_use]
    pub fn invalid_field_path(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldPath {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn unknown_association(table: impl Into<String>, association: impl Into<String>) -> Self {
        Self::UnknownAssociation {
            table: table.into(),
            association: association.into(),
        }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn account_required(table: impl Into<String>) -> Self {
        Self::AccountRequired {
            table: table.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// `true` when no account could be determined for the caller.
    ///
    /// Reads escalate these to [`TenancyError::AccountRequired`]; the
    /// auto-linker treats them as "do not enforce". Storage failures are never
    /// resolution failures.
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::NoIdentity | Self::NoAccountSelectable { .. })
    }
}
