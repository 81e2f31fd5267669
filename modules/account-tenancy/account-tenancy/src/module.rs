use std::sync::Arc;

use sea_orm::EntityTrait;
use tracing::info;

use account_tenancy_sdk::{AccountStore, TenancyError};

use crate::config::{ConfigError, TenancyConfig};
use crate::domain::catalog::Catalog;
use crate::domain::resolver::AccountResolver;
use crate::domain::scoper::{ExistenceProbeDetector, ProbeDetector};
use crate::domain::service::TenantTable;

/// Account tenancy wiring.
///
/// Holds the resolver shared by every table, the association catalog and the
/// probe detector, and hands out the per-table hooks.
pub struct AccountTenancy {
    config: TenancyConfig,
    resolver: Arc<AccountResolver>,
    catalog: Catalog,
    detector: Arc<dyn ProbeDetector>,
}

impl AccountTenancy {
    /// # Errors
    /// Returns [`ConfigError`] when `config` is invalid.
    pub fn new(
        config: TenancyConfig,
        store: Arc<dyn AccountStore>,
        catalog: Catalog,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            session_key = %config.session_key,
            tables = config.tables.len(),
            "Initializing account tenancy"
        );

        let resolver = Arc::new(AccountResolver::with_session_key(
            store,
            config.session_key.clone(),
        ));

        Ok(Self {
            config,
            resolver,
            catalog,
            detector: Arc::new(ExistenceProbeDetector),
        })
    }

    /// Replace the existence-probe detection hook.
    #[must_use]
    pub fn with_probe_detector(mut self, detector: Arc<dyn ProbeDetector>) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<AccountResolver> {
        &self.resolver
    }

    /// Hooks for the table of `E`, configured from `tables.<table_name>`.
    ///
    /// # Errors
    /// - `InvalidFieldPath` when the configured `account_field` names a missing column
    /// - `UnknownAssociation` when it names an undeclared association
    pub fn table<E: EntityTrait>(&self) -> Result<TenantTable<E>, TenancyError> {
        let name = E::default().table_name().to_owned();
        TenantTable::new(
            Arc::clone(&self.resolver),
            &self.catalog,
            &self.config.table(&name),
            Arc::clone(&self.detector),
        )
    }
}
