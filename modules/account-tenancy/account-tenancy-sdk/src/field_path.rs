//! Account field paths.
//!
//! Every tenant-owned table declares where its account identifier lives with a
//! short dot notation:
//!
//! | `account_field`                 | column       | table          | associations       |
//! |---------------------------------|--------------|----------------|--------------------|
//! | `account_id`                    | `account_id` | current table  | none               |
//! | `Users.account_id`              | `account_id` | `Users`        | `Users`            |
//! | `Orders.Users.account_id`       | `account_id` | `Users`        | `Orders.Users`     |
//!
//! The association prefix names associations (not physical tables) starting
//! from the current table; the last association is the one holding the column.

use std::fmt;

use crate::error::TenancyError;

const SEPARATOR: char = '.';

/// Parsed location of the account identifier for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFieldPath {
    /// The account column is on the table itself.
    Direct { table: String, column: String },
    /// The account column is reached through one or more associations.
    Associated {
        /// Alias of the last association, where `column` lives.
        table: String,
        column: String,
        /// Dot-joined association chain, e.g. `Orders.Users`.
        associations: String,
    },
}

impl AccountFieldPath {
    /// Parse an `account_field` configuration value.
    ///
    /// `current_table` is the alias of the table the configuration belongs to;
    /// it becomes the owning table of a direct column.
    ///
    /// # Errors
    /// Returns [`TenancyError::InvalidFieldPath`] for an empty value or a value
    /// with an empty segment (`".account_id"`, `"Users..account_id"`).
    pub fn parse(account_field: &str, current_table: &str) -> Result<Self, TenancyError> {
        if account_field.is_empty() {
            return Err(TenancyError::invalid_field_path(
                account_field,
                "must not be empty",
            ));
        }

        let Some((associations, column)) = account_field.rsplit_once(SEPARATOR) else {
            return Ok(Self::Direct {
                table: current_table.to_owned(),
                column: account_field.to_owned(),
            });
        };

        if column.is_empty() || associations.split(SEPARATOR).any(str::is_empty) {
            return Err(TenancyError::invalid_field_path(
                account_field,
                "segments must not be empty",
            ));
        }

        let table = associations
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or(associations);

        Ok(Self::Associated {
            table: table.to_owned(),
            column: column.to_owned(),
            associations: associations.to_owned(),
        })
    }

    /// Column holding the account identifier.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Direct { column, .. } | Self::Associated { column, .. } => column,
        }
    }

    /// Table (or association alias) owning [`Self::column`].
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Direct { table, .. } | Self::Associated { table, .. } => table,
        }
    }

    /// Dot-joined association chain, `None` for a direct column.
    #[must_use]
    pub fn associations(&self) -> Option<&str> {
        match self {
            Self::Direct { .. } => None,
            Self::Associated { associations, .. } => Some(associations),
        }
    }

    /// Association names in traversal order, empty for a direct column.
    pub fn association_names(&self) -> impl Iterator<Item = &str> {
        self.associations()
            .into_iter()
            .flat_map(|chain| chain.split(SEPARATOR))
    }

    /// Number of association hops between the current table and the column.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.association_names().count()
    }
}

impl fmt::Display for AccountFieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.table(), self.column())
    }
}
