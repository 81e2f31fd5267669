//! Account Tenancy Module
//!
//! Scopes every read against a tenant-owned table to the active account and
//! links new rows to it on save.
//!
//! ## Architecture
//!
//! ### Contract Layer (`account-tenancy-sdk`)
//! - `AccountStore` / `SessionStore` collaborator traits
//! - `Account`, `NewAccount`, `AccountFieldPath`, `TableTenancyConfig`
//! - `TenancyError`
//!
//! ### Domain Layer (`account_tenancy::domain`)
//! - `resolver` - active-account resolution with a per-session cache
//! - `scoper` - read-query restriction and skip heuristics
//! - `auto_link` - save-time account column population
//! - `service` - per-table hooks (`TenantTable`) and their request binding (`TenantScope`)
//! - `catalog` - declared associations used to translate field paths into joins
//!
//! ### Infrastructure Layer (`account_tenancy::infra`)
//! - `storage/` - `SeaORM` entities, migrations and `SeaOrmAccountStore`
//! - `session` - in-memory `SessionStore`
//!
//! ## Usage
//!
//! ```ignore
//! let tenancy = AccountTenancy::new(config, store, catalog)?;
//! let orders = tenancy.table::<order::Entity>()?;
//!
//! let mut scope = orders.bind(&ctx);
//! let rows = scope.find_all(&conn, ReadQuery::find()).await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// === PUBLIC API (from SDK) ===
pub use account_tenancy_sdk::{
    Account, AccountFieldPath, AccountId, AccountStore, NewAccount, RequestContext,
    SecurityContext, SessionStore, TableTenancyConfig, TenancyError, UserId,
};

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{ConfigError, TenancyConfig};
pub use domain::auto_link::{LinkOutcome, LinkSkip};
pub use domain::catalog::{Association, AssociationKind, Catalog, TableSchema};
pub use domain::query::{Origin, ReadQuery};
pub use domain::resolver::AccountResolver;
pub use domain::scoper::{ExistenceProbeDetector, ProbeDetector};
pub use domain::service::{TenantScope, TenantTable};
pub use infra::session::InMemorySessionStore;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::sea_orm_store::SeaOrmAccountStore;
pub use module::AccountTenancy;
