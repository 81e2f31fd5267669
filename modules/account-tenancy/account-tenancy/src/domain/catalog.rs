//! Association catalog.
//!
//! Account field paths name associations (`Orders.Users.account_id`); the
//! catalog maps those names to physical tables and join keys so the scoper can
//! build the matching sub-query and the auto-linker can find the foreign key to
//! fill. Paths are resolved once, when per-table hooks are built.

use std::collections::HashMap;

use account_tenancy_sdk::{AccountFieldPath, TenancyError};

const DEFAULT_PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// The source row carries the foreign key (`orders.user_id -> users.id`).
    BelongsTo,
    /// The target rows carry the foreign key (`users.id <- orders.user_id`).
    HasMany,
}

/// A named association from one table to another.
///
/// Joins are always `source.source_key = target.target_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    name: String,
    table: String,
    kind: AssociationKind,
    source_key: String,
    target_key: String,
}

impl Association {
    /// `name` points at `table` through `foreign_key` on the source table.
    #[must_use]
    pub fn belongs_to(
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            kind: AssociationKind::BelongsTo,
            source_key: foreign_key.into(),
            target_key: DEFAULT_PRIMARY_KEY.to_owned(),
        }
    }

    /// `name` collects the rows of `table` whose `foreign_key` points back at the source.
    #[must_use]
    pub fn has_many(
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            kind: AssociationKind::HasMany,
            source_key: DEFAULT_PRIMARY_KEY.to_owned(),
            target_key: foreign_key.into(),
        }
    }

    /// Override the key on the side that does not hold the foreign key.
    #[must_use]
    pub fn binding_key(mut self, key: impl Into<String>) -> Self {
        match self.kind {
            AssociationKind::BelongsTo => self.target_key = key.into(),
            AssociationKind::HasMany => self.source_key = key.into(),
        }
        self
    }

    /// Association alias, as used in field paths and generated SQL.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical table of the association target.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// Join column on the source table.
    #[must_use]
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// Join column on the target table.
    #[must_use]
    pub fn target_key(&self) -> &str {
        &self.target_key
    }
}

/// Declared associations of one physical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    associations: Vec<Association>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            associations: Vec::new(),
        }
    }

    #[must_use]
    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn find_association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name == name)
    }
}

/// All tables known to the tenancy layer, keyed by physical table name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, TableSchema>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, schema: TableSchema) -> Self {
        self.register(schema);
        self
    }

    /// Add or replace a table schema.
    pub fn register(&mut self, schema: TableSchema) {
        self.tables.insert(schema.name.clone(), schema);
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Walk the association chain of `path` starting at `table`.
    ///
    /// Returns one hop per association, in traversal order; empty for a direct path.
    ///
    /// # Errors
    /// Returns [`TenancyError::UnknownAssociation`] when a hop is not declared on
    /// the table it starts from.
    pub fn resolve_path(
        &self,
        table: &str,
        path: &AccountFieldPath,
    ) -> Result<Vec<Association>, TenancyError> {
        let mut hops = Vec::with_capacity(path.depth());
        let mut current = table;

        for name in path.association_names() {
            let association = self
                .table(current)
                .and_then(|schema| schema.find_association(name))
                .ok_or_else(|| TenancyError::unknown_association(current, name))?;
            hops.push(association.clone());
            current = association.table();
        }

        Ok(hops)
    }
}
