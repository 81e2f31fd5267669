//! Save-time auto-linking of the account column.

use std::fmt;

use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ColumnType, ConnectionTrait, EntityTrait,
    IdenStatic, Value,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use account_tenancy_sdk::{Account, AccountFieldPath, TenancyError};

use super::catalog::{Association, AssociationKind};
use super::query::Origin;

const LINKED_KEY: &str = "linked_key";

/// Result of one auto-link attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// `column` was empty and has been filled.
    Linked { column: String },
    /// `column` already carried a value and was left alone.
    AlreadySet { column: String },
    Skipped(LinkSkip),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSkip {
    /// The table did not opt in.
    Disabled,
    /// Save issued internally, e.g. for an associated entity.
    NotPrimary,
    /// No account could be resolved for the caller.
    NoAccount,
    /// The account column is more than one association away.
    DeepAssociation,
    /// The first association does not put a foreign key on this table.
    NotBelongsTo,
    /// The account owns no row of the associated table.
    NoRelatedRow,
}

enum LinkTarget<E: EntityTrait> {
    Direct(E::Column),
    Associated {
        foreign_key: E::Column,
        hop: Association,
        column: String,
    },
    Unsupported(LinkSkip),
}

/// Fills the account reference of an entity about to be saved.
///
/// The target column is resolved against `E` once, at construction; an
/// unknown column is a configuration error. Populated values are never
/// overwritten.
pub struct SaveAutoLinker<E: EntityTrait> {
    enabled: bool,
    target: LinkTarget<E>,
}

impl<E: EntityTrait> fmt::Debug for SaveAutoLinker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            LinkTarget::Direct(column) => format!("direct({})", column.as_str()),
            LinkTarget::Associated { foreign_key, .. } => {
                format!("associated({})", foreign_key.as_str())
            }
            LinkTarget::Unsupported(skip) => format!("unsupported({skip:?})"),
        };
        f.debug_struct("SaveAutoLinker")
            .field("enabled", &self.enabled)
            .field("target", &target)
            .finish()
    }
}

impl<E: EntityTrait> SaveAutoLinker<E> {
    /// `hops` must be the association chain of `path` as resolved by the catalog.
    ///
    /// # Errors
    /// Returns [`TenancyError::InvalidFieldPath`] when auto-linking is enabled
    /// and the column to fill does not exist on `E` or is not a UUID column.
    pub fn new(
        enabled: bool,
        path: &AccountFieldPath,
        hops: &[Association],
    ) -> Result<Self, TenancyError> {
        let target = if enabled {
            Self::target(path, hops)?
        } else {
            LinkTarget::Unsupported(LinkSkip::Disabled)
        };
        Ok(Self { enabled, target })
    }

    fn target(
        path: &AccountFieldPath,
        hops: &[Association],
    ) -> Result<LinkTarget<E>, TenancyError> {
        match hops {
            [] => Ok(LinkTarget::Direct(Self::column(path, path.column())?)),
            [hop] if hop.kind() == AssociationKind::BelongsTo => Ok(LinkTarget::Associated {
                foreign_key: Self::column(path, hop.source_key())?,
                hop: hop.clone(),
                column: path.column().to_owned(),
            }),
            [_] => Ok(LinkTarget::Unsupported(LinkSkip::NotBelongsTo)),
            _ => Ok(LinkTarget::Unsupported(LinkSkip::DeepAssociation)),
        }
    }

    fn column(path: &AccountFieldPath, name: &str) -> Result<E::Column, TenancyError> {
        let column = name.parse::<E::Column>().map_err(|_| {
            TenancyError::invalid_field_path(
                path.to_string(),
                format!("no column '{name}' on table '{}'", E::default().table_name()),
            )
        })?;
        // The generated setter panics on a value of another type.
        if !matches!(column.def().get_column_type(), ColumnType::Uuid) {
            return Err(TenancyError::invalid_field_path(
                path.to_string(),
                format!(
                    "column '{name}' on table '{}' is not a UUID column",
                    E::default().table_name()
                ),
            ));
        }
        Ok(column)
    }

    /// Skip decision that needs neither the account nor the entity.
    ///
    /// Checked before resolving so that skipped saves never touch the session
    /// or the store.
    #[must_use]
    pub fn precheck(&self, origin: Origin) -> Option<LinkSkip> {
        if !self.enabled {
            return Some(LinkSkip::Disabled);
        }
        if !origin.is_primary() {
            return Some(LinkSkip::NotPrimary);
        }
        match self.target {
            LinkTarget::Unsupported(skip) => Some(skip),
            _ => None,
        }
    }

    /// Fill the account reference of `model` for `account`.
    ///
    /// Associated targets take the first row of the associated table owned by
    /// the account; the account is expected to own exactly one.
    ///
    /// # Errors
    /// Returns [`TenancyError::Internal`] when the related-row lookup fails.
    pub async fn link<C, A>(
        &self,
        conn: &C,
        model: &mut A,
        account: &Account,
    ) -> Result<LinkOutcome, TenancyError>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + Send,
    {
        match &self.target {
            LinkTarget::Unsupported(skip) => Ok(LinkOutcome::Skipped(*skip)),
            LinkTarget::Direct(column) => {
                let column_name = column.as_str().to_owned();
                if !is_missing(&model.get(*column)) {
                    return Ok(LinkOutcome::AlreadySet {
                        column: column_name,
                    });
                }
                model.set(*column, Value::from(account.id));
                debug!(column = %column_name, account_id = %account.id, "Account column linked");
                Ok(LinkOutcome::Linked {
                    column: column_name,
                })
            }
            LinkTarget::Associated {
                foreign_key,
                hop,
                column,
            } => {
                let column_name = foreign_key.as_str().to_owned();
                if !is_missing(&model.get(*foreign_key)) {
                    return Ok(LinkOutcome::AlreadySet {
                        column: column_name,
                    });
                }
                let Some(key) = related_key(conn, hop, column, account.id).await? else {
                    warn!(
                        table = %hop.table(),
                        account_id = %account.id,
                        "No associated row owned by the account, leaving foreign key empty"
                    );
                    return Ok(LinkOutcome::Skipped(LinkSkip::NoRelatedRow));
                };
                model.set(*foreign_key, Value::from(key));
                debug!(column = %column_name, related_id = %key, "Foreign key linked");
                Ok(LinkOutcome::Linked {
                    column: column_name,
                })
            }
        }
    }
}

fn is_missing(value: &ActiveValue<Value>) -> bool {
    match value {
        ActiveValue::NotSet => true,
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v == v.as_null(),
    }
}

async fn related_key<C: ConnectionTrait>(
    conn: &C,
    hop: &Association,
    column: &str,
    account_id: Uuid,
) -> Result<Option<Uuid>, TenancyError> {
    let query = Query::select()
        .expr_as(
            Expr::col(Alias::new(hop.target_key())),
            Alias::new(LINKED_KEY),
        )
        .from(Alias::new(hop.table()))
        .and_where(Expr::col(Alias::new(column)).eq(account_id))
        .limit(1)
        .to_owned();
    let stmt = conn.get_database_backend().build(&query);

    let row = conn.query_one(stmt).await.map_err(|e| {
        error!(table = %hop.table(), error = %e, "Related row lookup failed");
        TenancyError::internal(format!("related row lookup on '{}': {e}", hop.table()))
    })?;

    row.map(|row| row.try_get::<Uuid>("", LINKED_KEY))
        .transpose()
        .map_err(|e| TenancyError::internal(format!("decode related key: {e}")))
}
