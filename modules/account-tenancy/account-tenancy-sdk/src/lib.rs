//! Account Tenancy SDK
//!
//! This crate provides the public contract for the `account_tenancy` module:
//!
//! - [`AccountStore`] - Collaborator trait for account records and memberships
//! - [`SessionStore`] - Collaborator trait for the per-session account cache
//! - [`SecurityContext`] / [`RequestContext`] - Identity and request-scoped capabilities
//! - [`AccountFieldPath`] - Parsed location of a table's account column
//! - [`TableTenancyConfig`] - Per-table configuration surface
//! - [`Account`] / [`NewAccount`] - Account models
//! - [`TenancyError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use account_tenancy_sdk::{RequestContext, SecurityContext};
//!
//! let security = SecurityContext::builder().subject_id(user_id).build();
//! let ctx = RequestContext::new(security, session);
//!
//! let account = resolver.resolve(&ctx).await?;
//! ```

pub mod api;
pub mod context;
pub mod error;
pub mod field_path;
pub mod models;
pub mod table_config;

// Re-export main types at crate root
pub use api::{AccountStore, SessionStore};
pub use context::{RequestContext, SecurityContext};
pub use error::TenancyError;
pub use field_path::AccountFieldPath;
pub use models::{Account, AccountId, NewAccount, UserId};
pub use table_config::{DEFAULT_ACCOUNT_FIELD, TableTenancyConfig};
