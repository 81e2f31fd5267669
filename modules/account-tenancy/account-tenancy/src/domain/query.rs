use std::marker::PhantomData;

use sea_orm::sea_query::{Alias, Expr, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryTrait, Select, Statement,
};

/// Column name of the synthetic constant selected by existence probes.
pub const EXISTENCE_COLUMN: &str = "existing";

/// Where a read query comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Issued by the caller.
    Primary,
    /// Synthesized to load an association of a primary query.
    Association,
}

impl Origin {
    #[must_use]
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// What the query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Entity columns.
    Columns,
    /// A single constant, e.g. `SELECT 1 AS existing`.
    Constant { alias: String, value: i64 },
}

/// Observable shape of a read query, inspected by skip heuristics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryShape {
    /// Whether results are materialized into entity models.
    pub hydrate: bool,
    pub projection: Projection,
}

/// A read query against the table of `E`, not yet executed.
///
/// Wraps the `SeaORM` select statement together with the alias its columns
/// are qualified with and the shape information the tenancy hooks need.
///
/// # Example
/// ```rust,ignore
/// let query = ReadQuery::<order::Entity>::find()
///     .filter(Condition::all().add(order::Column::Total.gt(10)));
/// let query = scope.scope(query, Origin::Primary).await?;
/// let orders = query.all(&conn).await?;
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct ReadQuery<E: EntityTrait> {
    alias: String,
    statement: SelectStatement,
    shape: QueryShape,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> ReadQuery<E> {
    /// Select all columns of `E`.
    pub fn find() -> Self {
        Self::from_select(E::find())
    }

    /// Wrap an existing `SeaORM` select.
    pub fn from_select(select: Select<E>) -> Self {
        Self {
            alias: E::default().table_name().to_owned(),
            statement: select.into_query(),
            shape: QueryShape {
                hydrate: true,
                projection: Projection::Columns,
            },
            _entity: PhantomData,
        }
    }

    /// "Does a row matching `condition` exist" probe.
    ///
    /// Selects the single constant `1 AS existing` without hydration, which is
    /// how uniqueness checks are issued.
    pub fn existence_probe(condition: Condition) -> Self {
        let alias = E::default().table_name().to_owned();
        let statement = Query::select()
            .expr_as(Expr::val(1), Alias::new(EXISTENCE_COLUMN))
            .from(Alias::new(alias.as_str()))
            .cond_where(condition)
            .limit(1)
            .to_owned();

        Self {
            alias,
            statement,
            shape: QueryShape {
                hydrate: false,
                projection: Projection::Constant {
                    alias: EXISTENCE_COLUMN.to_owned(),
                    value: 1,
                },
            },
            _entity: PhantomData,
        }
    }

    /// Add caller filters. Tenancy conditions added later are AND-ed with them.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.statement.cond_where(condition);
        self
    }

    pub(crate) fn and_where(mut self, expr: SimpleExpr) -> Self {
        self.statement.and_where(expr);
        self
    }

    /// Alias the query's own columns are qualified with.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[must_use]
    pub fn shape(&self) -> &QueryShape {
        &self.shape
    }

    #[must_use]
    pub fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    #[must_use]
    pub fn build(&self, backend: DbBackend) -> Statement {
        backend.build(&self.statement)
    }

    /// Execute and hydrate every row.
    ///
    /// # Errors
    /// Returns `DbErr` if the database query fails.
    pub async fn all<C: ConnectionTrait>(self, conn: &C) -> Result<Vec<E::Model>, DbErr> {
        let stmt = self.build(conn.get_database_backend());
        E::find().from_raw_sql(stmt).all(conn).await
    }

    /// Execute and hydrate the first row.
    ///
    /// # Errors
    /// Returns `DbErr` if the database query fails.
    pub async fn one<C: ConnectionTrait>(self, conn: &C) -> Result<Option<E::Model>, DbErr> {
        let stmt = self.build(conn.get_database_backend());
        E::find().from_raw_sql(stmt).one(conn).await
    }

    /// Execute and report whether any row came back.
    ///
    /// # Errors
    /// Returns `DbErr` if the database query fails.
    pub async fn exists<C: ConnectionTrait>(self, conn: &C) -> Result<bool, DbErr> {
        let stmt = self.build(conn.get_database_backend());
        Ok(conn.query_one(stmt).await?.is_some())
    }
}
