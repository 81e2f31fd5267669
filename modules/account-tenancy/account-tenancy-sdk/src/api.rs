//! Collaborator traits consumed by the account tenancy module.
//!
//! The module never talks to a concrete database or session backend directly:
//! account records come from an [`AccountStore`] and the active-account cache
//! lives in a [`SessionStore`]. Implementations are registered by the host
//! application (the module ships a `SeaORM` store and an in-memory session).

use async_trait::async_trait;

use crate::error::TenancyError;
use crate::models::{Account, AccountId, NewAccount, UserId};

/// Read/write access to accounts and their memberships.
///
/// Every lookup goes through the membership relation: an account is only
/// visible to a user who is a member of it.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Accounts `user_id` is a member of, most recently accessed first.
    ///
    /// Accounts that were never accessed sort last.
    ///
    /// # Errors
    /// - `Internal` on storage failure
    async fn find_by_member(&self, user_id: UserId) -> Result<Vec<Account>, TenancyError>;

    /// The account `account_id` if `user_id` is a member of it.
    ///
    /// # Errors
    /// - `Internal` on storage failure
    async fn find_by_id_member(
        &self,
        account_id: AccountId,
        user_id: UserId,
    ) -> Result<Option<Account>, TenancyError>;

    /// Set the account's `accessed` timestamp to now and return the updated record.
    ///
    /// `accessed` never moves backwards for a given account.
    ///
    /// # Errors
    /// - `AccountNotFound` if the account does not exist
    /// - `Internal` on storage failure
    async fn touch_accessed(&self, account_id: AccountId) -> Result<Account, TenancyError>;

    /// Create an account with `user_id` as its first member.
    ///
    /// # Errors
    /// - `Validation` if the account data is rejected
    /// - `Internal` on storage failure
    async fn create_for_member(
        &self,
        user_id: UserId,
        account: NewAccount,
    ) -> Result<Account, TenancyError>;

    /// Grant `user_id` access to `account_id`. Granting twice is a no-op.
    ///
    /// # Errors
    /// - `AccountNotFound` if the account does not exist
    /// - `Internal` on storage failure
    async fn add_member(&self, account_id: AccountId, user_id: UserId) -> Result<(), TenancyError>;
}

/// Per-session key-value storage.
///
/// One instance represents one client session; isolation between sessions is
/// the implementation's responsibility.
pub trait SessionStore: Send + Sync {
    fn read(&self, key: &str) -> Option<serde_json::Value>;

    fn write(&self, key: &str, value: serde_json::Value);

    fn delete(&self, key: &str);
}
