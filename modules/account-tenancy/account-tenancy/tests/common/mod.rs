#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures: an in-memory `SQLite` database with the account schema and
//! a small shop schema (`users` -> `orders` -> `order_items`) owned through
//! `users.account_id`.

use std::sync::Arc;

use account_tenancy::infra::storage::entity::account;
use account_tenancy::{
    Association, Catalog, InMemorySessionStore, Migrator, RequestContext, SeaOrmAccountStore,
    SecurityContext, TableSchema, UserId,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use sea_orm_migration::prelude as mig;
use uuid::Uuid;

pub mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub account_id: Option<Uuid>,
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod order {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Option<Uuid>,
        pub number: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod order_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "order_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub order_id: Option<Uuid>,
        pub sku: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1);
    let db = Database::connect(opts).await.expect("connect");

    Migrator::up(&db, None).await.expect("account migrations");
    create_shop_tables(&db).await;
    db
}

async fn create_shop_tables(db: &DatabaseConnection) {
    let manager = mig::SchemaManager::new(db);
    let tables: [(&str, &str, mig::ColumnDef); 3] = [
        (
            "users",
            "account_id",
            mig::ColumnDef::new(mig::Alias::new("email")).string().not_null().to_owned(),
        ),
        (
            "orders",
            "user_id",
            mig::ColumnDef::new(mig::Alias::new("number")).string().not_null().to_owned(),
        ),
        (
            "order_items",
            "order_id",
            mig::ColumnDef::new(mig::Alias::new("sku")).string().not_null().to_owned(),
        ),
    ];

    for (table, reference, mut payload) in tables {
        manager
            .create_table(
                mig::Table::create()
                    .table(mig::Alias::new(table))
                    .col(
                        mig::ColumnDef::new(mig::Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(mig::ColumnDef::new(mig::Alias::new(reference)).uuid().null())
                    .col(&mut payload)
                    .to_owned(),
            )
            .await
            .expect("create shop table");
    }
}

pub fn shop_catalog() -> Catalog {
    Catalog::new()
        .with_table(TableSchema::new("users").association(Association::has_many(
            "Orders",
            "orders",
            "user_id",
        )))
        .with_table(
            TableSchema::new("orders")
                .association(Association::belongs_to("Users", "users", "user_id")),
        )
        .with_table(
            TableSchema::new("order_items")
                .association(Association::belongs_to("Orders", "orders", "order_id")),
        )
}

pub fn store(db: &DatabaseConnection) -> Arc<SeaOrmAccountStore> {
    Arc::new(SeaOrmAccountStore::new(db.clone()))
}

pub fn ctx_for(user_id: UserId) -> RequestContext {
    RequestContext::new(
        SecurityContext::for_user(user_id),
        Arc::new(InMemorySessionStore::new()),
    )
}

pub fn anonymous_ctx() -> RequestContext {
    RequestContext::new(
        SecurityContext::anonymous(),
        Arc::new(InMemorySessionStore::new()),
    )
}

/// Force `accessed` of an account, bypassing the monotonic store update.
pub async fn set_accessed(db: &DatabaseConnection, account_id: Uuid, at: Option<DateTime<Utc>>) {
    account::ActiveModel {
        id: ActiveValue::Unchanged(account_id),
        accessed: ActiveValue::Set(at),
        ..Default::default()
    }
    .update(db)
    .await
    .expect("set accessed");
}

pub async fn insert_user(db: &DatabaseConnection, account_id: Option<Uuid>, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: ActiveValue::Set(id),
        account_id: ActiveValue::Set(account_id),
        email: ActiveValue::Set(email.to_owned()),
    }
    .insert(db)
    .await
    .expect("insert user");
    id
}

pub async fn insert_order(db: &DatabaseConnection, user_id: Option<Uuid>, number: &str) -> Uuid {
    let id = Uuid::new_v4();
    order::ActiveModel {
        id: ActiveValue::Set(id),
        user_id: ActiveValue::Set(user_id),
        number: ActiveValue::Set(number.to_owned()),
    }
    .insert(db)
    .await
    .expect("insert order");
    id
}

pub async fn insert_item(db: &DatabaseConnection, order_id: Option<Uuid>, sku: &str) -> Uuid {
    let id = Uuid::new_v4();
    order_item::ActiveModel {
        id: ActiveValue::Set(id),
        order_id: ActiveValue::Set(order_id),
        sku: ActiveValue::Set(sku.to_owned()),
    }
    .insert(db)
    .await
    .expect("insert order item");
    id
}
