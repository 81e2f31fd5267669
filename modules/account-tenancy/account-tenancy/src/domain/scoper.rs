//! Read-query scoping.
//!
//! Restricts reads against a tenant-owned table to the rows owned by the
//! active account:
//!
//! | Field path               | Condition added                                                          |
//! |--------------------------|--------------------------------------------------------------------------|
//! | `account_id`             | `t.account_id = :account`                                                |
//! | `Users.account_id`       | `t.user_id IN (SELECT Users.id FROM users AS Users WHERE Users.account_id = :account)` |
//! | `Orders.Users.account_id`| same, with `INNER JOIN users AS Users` inside the sub-query              |
//!
//! Association paths use an `IN (sub-query)` matching predicate instead of a
//! join on the outer query, so the outer row set is never multiplied and the
//! caller's own joins are left alone.

use sea_orm::EntityTrait;
use sea_orm::sea_query::{Alias, Expr, JoinType, Query, SimpleExpr};
use uuid::Uuid;

use account_tenancy_sdk::AccountFieldPath;

use super::catalog::Association;
use super::query::{EXISTENCE_COLUMN, Origin, Projection, QueryShape, ReadQuery};

/// Detection hook for internal existence probes.
///
/// Existence checks back uniqueness rules, which are global rather than
/// per-account, so they must reach the table unscoped. How a probe is
/// recognized depends on the query layer; the default matches queries built
/// with [`ReadQuery::existence_probe`].
pub trait ProbeDetector: Send + Sync {
    fn is_existence_probe(&self, shape: &QueryShape) -> bool;
}

/// Hydration disabled and a single constant `existing` column selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistenceProbeDetector;

impl ProbeDetector for ExistenceProbeDetector {
    fn is_existence_probe(&self, shape: &QueryShape) -> bool {
        !shape.hydrate
            && matches!(
                &shape.projection,
                Projection::Constant { alias, value } if alias == EXISTENCE_COLUMN && *value == 1
            )
    }
}

/// Why a query passes through unscoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSkip {
    /// Association sub-query; the account column may not exist in its result shape.
    NonPrimary,
    /// Internal existence probe.
    ExistenceProbe,
}

/// Scoping rules of one table, built once from its field path.
pub struct QueryScoper {
    path: AccountFieldPath,
    hops: Vec<Association>,
    detector: std::sync::Arc<dyn ProbeDetector>,
}

impl QueryScoper {
    /// `hops` must be the association chain of `path` as resolved by the catalog.
    #[must_use]
    pub fn new(
        path: AccountFieldPath,
        hops: Vec<Association>,
        detector: std::sync::Arc<dyn ProbeDetector>,
    ) -> Self {
        debug_assert_eq!(path.depth(), hops.len());
        Self {
            path,
            hops,
            detector,
        }
    }

    #[must_use]
    pub fn path(&self) -> &AccountFieldPath {
        &self.path
    }

    /// Decide whether `query` must be left untouched.
    #[must_use]
    pub fn skip_reason<E: EntityTrait>(
        &self,
        query: &ReadQuery<E>,
        origin: Origin,
    ) -> Option<ScopeSkip> {
        if !origin.is_primary() {
            return Some(ScopeSkip::NonPrimary);
        }
        if self.detector.is_existence_probe(query.shape()) {
            return Some(ScopeSkip::ExistenceProbe);
        }
        None
    }

    /// AND the account condition into `query`.
    pub fn restrict<E: EntityTrait>(&self, query: ReadQuery<E>, account_id: Uuid) -> ReadQuery<E> {
        let condition = self.account_condition(query.alias(), account_id);
        query.and_where(condition)
    }

    /// Condition selecting rows of `alias` owned by `account_id`.
    #[must_use]
    pub fn account_condition(&self, alias: &str, account_id: Uuid) -> SimpleExpr {
        let Some((first, rest)) = self.hops.split_first() else {
            return col(alias, self.path.column()).eq(account_id);
        };

        let mut matching = Query::select();
        matching
            .column((Alias::new(first.name()), Alias::new(first.target_key())))
            .from_as(Alias::new(first.table()), Alias::new(first.name()));

        let mut previous = first;
        for hop in rest {
            matching.join_as(
                JoinType::InnerJoin,
                Alias::new(hop.table()),
                Alias::new(hop.name()),
                col(previous.name(), hop.source_key())
                    .equals((Alias::new(hop.name()), Alias::new(hop.target_key()))),
            );
            previous = hop;
        }
        matching.and_where(col(self.path.table(), self.path.column()).eq(account_id));

        col(alias, first.source_key()).in_subquery(matching)
    }
}

fn col(table: &str, column: &str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}
