use std::collections::HashMap;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use account_tenancy_sdk::{TableTenancyConfig, TenancyError};

use crate::domain::resolver::DEFAULT_SESSION_KEY;

/// Environment variable prefix; nested keys are separated with `__`.
pub const ENV_PREFIX: &str = "ACCOUNT_TENANCY_";

/// Configuration for the `account_tenancy` module
///
/// ```yaml
/// session_key: account_tenancy.account
/// tables:
///   orders:
///     auto_link_direct: true
///   order_items:
///     account_field: Orders.account_id
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenancyConfig {
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Tenant-owned tables by physical table name.
    #[serde(default)]
    pub tables: HashMap<String, TableTenancyConfig>,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
            tables: HashMap::new(),
        }
    }
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_owned()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration for table '{table}': {source}")]
    Table {
        table: String,
        #[source]
        source: TenancyError,
    },

    #[error("session_key must not be empty")]
    EmptySessionKey,
}

impl TenancyConfig {
    /// Layer defaults, the YAML file at `path` and `ACCOUNT_TENANCY_*`
    /// environment variables, in that order.
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a layer cannot be parsed or the merged
    /// configuration is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError`] for an empty session key or a malformed table
    /// `account_field`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_key.trim().is_empty() {
            return Err(ConfigError::EmptySessionKey);
        }
        for (table, cfg) in &self.tables {
            cfg.validate().map_err(|source| ConfigError::Table {
                table: table.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Configuration of `table`; unlisted tables use the defaults.
    #[must_use]
    pub fn table(&self, table: &str) -> TableTenancyConfig {
        self.tables.get(table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, config: TableTenancyConfig) -> Self {
        self.tables.insert(table.into(), config);
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = TenancyConfig::default();
        assert_eq!(cfg.session_key, "account_tenancy.account");
        assert!(cfg.tables.is_empty());
        assert_eq!(cfg.table("orders"), TableTenancyConfig::default());
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_yaml(
            r"
session_key: tenancy.current
tables:
  orders:
    auto_link_direct: true
  order_items:
    account_field: Orders.account_id
",
        );

        let cfg = temp_env::with_vars_unset(
            ["ACCOUNT_TENANCY_SESSION_KEY", "ACCOUNT_TENANCY_TABLES__ORDERS__AUTO_LINK_DIRECT"],
            || TenancyConfig::load(file.path()),
        )
        .unwrap();

        assert_eq!(cfg.session_key, "tenancy.current");
        assert!(cfg.table("orders").auto_link_direct);
        assert_eq!(cfg.table("orders").account_field, "account_id");
        assert_eq!(cfg.table("order_items").account_field, "Orders.account_id");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_yaml(
            r"
tables:
  orders:
    auto_link_direct: false
",
        );

        let cfg = temp_env::with_vars(
            [
                ("ACCOUNT_TENANCY_SESSION_KEY", Some("from.env")),
                (
                    "ACCOUNT_TENANCY_TABLES__ORDERS__AUTO_LINK_DIRECT",
                    Some("true"),
                ),
            ],
            || TenancyConfig::load(file.path()),
        )
        .unwrap();

        assert_eq!(cfg.session_key, "from.env");
        assert!(cfg.table("orders").auto_link_direct);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = temp_env::with_vars_unset(["ACCOUNT_TENANCY_SESSION_KEY"], || {
            TenancyConfig::load(dir.path().join("absent.yaml"))
        })
        .unwrap();

        assert_eq!(cfg, TenancyConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let file = write_yaml("sesion_key: typo\n");
        let result = temp_env::with_vars_unset(["ACCOUNT_TENANCY_SESSION_KEY"], || {
            TenancyConfig::load(file.path())
        });
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_malformed_account_field_names_the_table() {
        let cfg = TenancyConfig::default()
            .with_table("orders", TableTenancyConfig::with_account_field("Users..account_id"));

        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Table { ref table, .. } if table == "orders"));
    }

    #[test]
    fn test_empty_session_key_is_rejected() {
        let cfg = TenancyConfig {
            session_key: " ".to_owned(),
            ..TenancyConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptySessionKey)));
    }
}
