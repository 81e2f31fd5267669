use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use tracing::{debug, error, instrument};

use account_tenancy_sdk::{
    Account, AccountFieldPath, RequestContext, TableTenancyConfig, TenancyError,
};

use super::auto_link::{LinkOutcome, LinkSkip, SaveAutoLinker};
use super::catalog::Catalog;
use super::query::{Origin, ReadQuery};
use super::resolver::AccountResolver;
use super::scoper::{ProbeDetector, QueryScoper};

// ============================================================================
// Per-table hooks
// ============================================================================

/// Tenancy hooks of one tenant-owned table.
///
/// Built once per table: the field path is parsed, its associations resolved
/// against the catalog and the auto-link target checked against `E`. Bind it to
/// a request with [`TenantTable::bind`] to scope reads and link saves.
pub struct TenantTable<E: EntityTrait> {
    table: String,
    resolver: Arc<AccountResolver>,
    scoper: QueryScoper,
    linker: SaveAutoLinker<E>,
}

impl<E: EntityTrait> TenantTable<E> {
    /// # Errors
    /// - `InvalidFieldPath` when `account_field` is malformed or names a missing column
    /// - `UnknownAssociation` when the path names an undeclared association
    pub fn new(
        resolver: Arc<AccountResolver>,
        catalog: &Catalog,
        config: &TableTenancyConfig,
        detector: Arc<dyn ProbeDetector>,
    ) -> Result<Self, TenancyError> {
        let table = E::default().table_name().to_owned();
        let path = config.field_path(&table)?;
        let hops = catalog.resolve_path(&table, &path)?;
        let linker = SaveAutoLinker::new(config.auto_link_direct, &path, &hops)?;

        Ok(Self {
            table,
            resolver,
            scoper: QueryScoper::new(path, hops, detector),
            linker,
        })
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn field_path(&self) -> &AccountFieldPath {
        self.scoper.path()
    }

    /// Hooks bound to one request.
    #[must_use]
    pub fn bind<'a>(&'a self, ctx: &'a RequestContext) -> TenantScope<'a, E> {
        TenantScope {
            table: self,
            ctx,
            account: None,
        }
    }
}

// ============================================================================
// Request-bound hooks
// ============================================================================

/// [`TenantTable`] hooks bound to one request.
///
/// Resolves the active account at most once and reuses the local copy for every
/// read and save issued through it.
pub struct TenantScope<'a, E: EntityTrait> {
    table: &'a TenantTable<E>,
    ctx: &'a RequestContext,
    account: Option<Account>,
}

impl<E: EntityTrait> TenantScope<'_, E> {
    /// Active account, resolved on first use.
    ///
    /// # Errors
    /// Resolution errors, unchanged.
    pub async fn active_account(&mut self) -> Result<&Account, TenancyError> {
        let account = match self.account.take() {
            Some(account) => account,
            None => self.table.resolver.resolve(self.ctx).await?,
        };
        Ok(self.account.insert(account))
    }

    /// Restrict `query` to the active account.
    ///
    /// Non-primary queries and existence probes pass through unchanged.
    ///
    /// # Errors
    /// - `AccountRequired` when no account can be determined for the caller
    /// - store errors, unchanged
    #[instrument(skip_all, fields(table = %self.table.table, origin = ?origin))]
    pub async fn scope(
        &mut self,
        query: ReadQuery<E>,
        origin: Origin,
    ) -> Result<ReadQuery<E>, TenancyError> {
        if let Some(reason) = self.table.scoper.skip_reason(&query, origin) {
            debug!(?reason, "Query left unscoped");
            return Ok(query);
        }

        let table = self.table;
        let account = match self.active_account().await {
            Ok(account) => account,
            Err(e) if e.is_resolution_failure() => {
                debug!(error = %e, "No account for scoped read");
                return Err(TenancyError::account_required(&table.table));
            }
            Err(e) => return Err(e),
        };

        Ok(table.scoper.restrict(query, account.id))
    }

    /// Scope `query` as a primary read and load every row.
    ///
    /// # Errors
    /// Same as [`Self::scope`], plus `Internal` when the query fails.
    pub async fn find_all<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        query: ReadQuery<E>,
    ) -> Result<Vec<E::Model>, TenancyError> {
        let query = self.scope(query, Origin::Primary).await?;
        query.all(conn).await.map_err(|e| self.db_error(&e))
    }

    /// Scope `query` as a primary read and load the first row.
    ///
    /// # Errors
    /// Same as [`Self::scope`], plus `Internal` when the query fails.
    pub async fn find_one<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        query: ReadQuery<E>,
    ) -> Result<Option<E::Model>, TenancyError> {
        let query = self.scope(query, Origin::Primary).await?;
        query.one(conn).await.map_err(|e| self.db_error(&e))
    }

    /// Scope `query` as a primary read and report whether it matches a row.
    ///
    /// # Errors
    /// Same as [`Self::scope`], plus `Internal` when the query fails.
    pub async fn exists<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        query: ReadQuery<E>,
    ) -> Result<bool, TenancyError> {
        let query = self.scope(query, Origin::Primary).await?;
        query.exists(conn).await.map_err(|e| self.db_error(&e))
    }

    /// Fill the account reference of `model` before it is saved.
    ///
    /// A caller without a determinable account is not an error: the model is
    /// left unchanged and the outcome reports [`LinkSkip::NoAccount`].
    ///
    /// # Errors
    /// Store and lookup errors, unchanged.
    #[instrument(skip_all, fields(table = %self.table.table, origin = ?origin))]
    pub async fn auto_link<C, A>(
        &mut self,
        conn: &C,
        model: &mut A,
        origin: Origin,
    ) -> Result<LinkOutcome, TenancyError>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + Send,
    {
        if let Some(skip) = self.table.linker.precheck(origin) {
            debug!(?skip, "Auto-link skipped");
            return Ok(LinkOutcome::Skipped(skip));
        }

        let table = self.table;
        let account = match self.active_account().await {
            Ok(account) => account,
            Err(e) if e.is_resolution_failure() => {
                debug!(error = %e, "No account to link");
                return Ok(LinkOutcome::Skipped(LinkSkip::NoAccount));
            }
            Err(e) => return Err(e),
        };

        table.linker.link(conn, model, account).await
    }

    fn db_error(&self, e: &DbErr) -> TenancyError {
        error!(table = %self.table.table, error = %e, "Scoped read failed");
        TenancyError::internal(format!("read from '{}': {e}", self.table.table))
    }
}
