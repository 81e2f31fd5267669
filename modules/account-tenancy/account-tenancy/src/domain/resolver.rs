use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use account_tenancy_sdk::{
    Account, AccountId, AccountStore, NewAccount, RequestContext, TenancyError, UserId,
};

/// Default session key of the active-account cache entry.
pub const DEFAULT_SESSION_KEY: &str = "account_tenancy.account";

/// Determines the active account of a request.
///
/// The session cache is consulted first; a hit is returned as-is, without
/// touching the store. On a miss the member's most recently accessed account
/// is selected, its `accessed` timestamp advanced and the result cached.
pub struct AccountResolver {
    store: Arc<dyn AccountStore>,
    session_key: String,
}

impl AccountResolver {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self::with_session_key(store, DEFAULT_SESSION_KEY)
    }

    #[must_use]
    pub fn with_session_key(store: Arc<dyn AccountStore>, session_key: impl Into<String>) -> Self {
        Self {
            store,
            session_key: session_key.into(),
        }
    }

    #[must_use]
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Active account for `ctx`.
    ///
    /// # Errors
    /// - `NoIdentity` when nothing is cached and the caller is anonymous
    /// - `NoAccountSelectable` when the caller is a member of no account
    /// - store errors, unchanged
    #[instrument(skip_all, fields(user_id = ?ctx.security().subject_id()))]
    pub async fn resolve(&self, ctx: &RequestContext) -> Result<Account, TenancyError> {
        if let Some(account) = self.current(ctx) {
            debug!(account_id = %account.id, "Active account served from session");
            return Ok(account);
        }

        let user_id = Self::require_identity(ctx)?;
        let account = self
            .store
            .find_by_member(user_id)
            .await?
            .into_iter()
            .next()
            .ok_or(TenancyError::NoAccountSelectable { user_id })?;

        debug!(account_id = %account.id, "Falling back to most recently accessed account");
        self.activate(ctx, account.id).await
    }

    /// Make `account_id` the active account of `ctx`.
    ///
    /// # Errors
    /// - `NoIdentity` when the caller is anonymous
    /// - `AccountNotFound` when the caller is not a member of the account
    /// - store errors, unchanged
    #[instrument(skip(self, ctx), fields(user_id = ?ctx.security().subject_id()))]
    pub async fn select(
        &self,
        ctx: &RequestContext,
        account_id: AccountId,
    ) -> Result<Account, TenancyError> {
        let user_id = Self::require_identity(ctx)?;

        if self
            .store
            .find_by_id_member(account_id, user_id)
            .await?
            .is_none()
        {
            return Err(TenancyError::AccountNotFound { account_id });
        }

        let account = self.activate(ctx, account_id).await?;
        info!(account_id = %account.id, "Account selected");
        Ok(account)
    }

    /// Cached active account, without resolving.
    #[must_use]
    pub fn current(&self, ctx: &RequestContext) -> Option<Account> {
        let value = ctx.session().read(&self.session_key)?;
        match serde_json::from_value(value) {
            Ok(account) => Some(account),
            Err(e) => {
                warn!(key = %self.session_key, error = %e, "Ignoring undecodable session entry");
                None
            }
        }
    }

    /// Drop the cached selection; the next resolution falls back to the store.
    pub fn forget(&self, ctx: &RequestContext) {
        ctx.session().delete(&self.session_key);
    }

    /// Accounts the caller may select, most recently accessed first.
    ///
    /// Anonymous callers have none.
    ///
    /// # Errors
    /// Store errors, unchanged.
    #[instrument(skip_all, fields(user_id = ?ctx.security().subject_id()))]
    pub async fn available(&self, ctx: &RequestContext) -> Result<Vec<Account>, TenancyError> {
        match ctx.security().subject_id() {
            Some(user_id) => self.store.find_by_member(user_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Create an account owned by the caller.
    ///
    /// The new account is not selected.
    ///
    /// # Errors
    /// - `NoIdentity` when the caller is anonymous
    /// - `Validation` when the name is rejected
    /// - store errors, unchanged
    #[instrument(skip_all, fields(user_id = ?ctx.security().subject_id()))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        account: NewAccount,
    ) -> Result<Account, TenancyError> {
        let user_id = Self::require_identity(ctx)?;
        account
            .validate()
            .map_err(|message| TenancyError::validation("name", message))?;

        let account = self.store.create_for_member(user_id, account).await?;
        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    async fn activate(
        &self,
        ctx: &RequestContext,
        account_id: AccountId,
    ) -> Result<Account, TenancyError> {
        let account = self.store.touch_accessed(account_id).await?;
        let value = serde_json::to_value(&account)
            .map_err(|e| TenancyError::internal(format!("encode session entry: {e}")))?;
        ctx.session().write(&self.session_key, value);
        Ok(account)
    }

    fn require_identity(ctx: &RequestContext) -> Result<UserId, TenancyError> {
        ctx.security().subject_id().ok_or(TenancyError::NoIdentity)
    }
}
