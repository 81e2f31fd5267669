#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Scoped reads and save auto-linking through `AccountTenancy` on `SQLite`.
//!
//! Fixture: two accounts, each with one user, one order and one order item.
//! `users` carries the account directly, `orders` reaches it through `Users`
//! and `order_items` through `Orders.Users`.

mod common;

use std::collections::HashSet;

use account_tenancy::{
    Account, AccountTenancy, LinkOutcome, LinkSkip, NewAccount, Origin, ReadQuery,
    TableTenancyConfig, TenancyConfig, TenancyError,
};
use sea_orm::{ActiveValue, ColumnTrait, Condition, DatabaseConnection};
use uuid::Uuid;

use common::{
    anonymous_ctx, ctx_for, insert_item, insert_order, insert_user, order, order_item, setup_db,
    shop_catalog, store, user,
};

struct Tenant {
    member: Uuid,
    account: Account,
    user: Uuid,
    order: Uuid,
    item: Uuid,
}

struct Fixture {
    db: DatabaseConnection,
    tenancy: AccountTenancy,
    acme: Tenant,
    globex: Tenant,
}

async fn tenant(db: &DatabaseConnection, tenancy: &AccountTenancy, name: &str) -> Tenant {
    let member = Uuid::new_v4();
    let account = tenancy
        .resolver()
        .store()
        .create_for_member(member, NewAccount::new(name))
        .await
        .unwrap();
    let user = insert_user(db, Some(account.id), &format!("{name}@example.com")).await;
    let order = insert_order(db, Some(user), &format!("{name}-1")).await;
    let item = insert_item(db, Some(order), &format!("{name}-SKU")).await;
    Tenant {
        member,
        account,
        user,
        order,
        item,
    }
}

async fn fixture() -> Fixture {
    let db = setup_db().await;
    let config = TenancyConfig::default()
        .with_table("users", TableTenancyConfig::default().auto_link(true))
        .with_table(
            "orders",
            TableTenancyConfig::with_account_field("Users.account_id").auto_link(true),
        )
        .with_table(
            "order_items",
            TableTenancyConfig::with_account_field("Orders.Users.account_id").auto_link(true),
        );
    let tenancy = AccountTenancy::new(config, store(&db), shop_catalog()).unwrap();

    let acme = tenant(&db, &tenancy, "acme").await;
    let globex = tenant(&db, &tenancy, "globex").await;

    Fixture {
        db,
        tenancy,
        acme,
        globex,
    }
}

fn ids<M, F: Fn(&M) -> Uuid>(rows: &[M], id: F) -> HashSet<Uuid> {
    rows.iter().map(id).collect()
}

#[tokio::test]
async fn direct_column_reads_are_scoped() {
    let f = fixture().await;
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);

    let rows = users
        .bind(&ctx)
        .find_all(&f.db, ReadQuery::find())
        .await
        .unwrap();

    assert_eq!(ids(&rows, |u| u.id), HashSet::from([f.acme.user]));
    assert!(rows.iter().all(|u| u.account_id == Some(f.acme.account.id)));
}

#[tokio::test]
async fn single_association_reads_are_scoped() {
    let f = fixture().await;
    let orders = f.tenancy.table::<order::Entity>().unwrap();
    let ctx = ctx_for(f.globex.member);

    let rows = orders
        .bind(&ctx)
        .find_all(&f.db, ReadQuery::find())
        .await
        .unwrap();

    assert_eq!(ids(&rows, |o| o.id), HashSet::from([f.globex.order]));
}

#[tokio::test]
async fn association_chain_reads_are_scoped() {
    let f = fixture().await;
    let items = f.tenancy.table::<order_item::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);

    let rows = items
        .bind(&ctx)
        .find_all(&f.db, ReadQuery::find())
        .await
        .unwrap();

    assert_eq!(ids(&rows, |i| i.id), HashSet::from([f.acme.item]));
}

#[tokio::test]
async fn caller_filters_combine_with_the_account_filter() {
    let f = fixture().await;
    let orders = f.tenancy.table::<order::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);
    let mut scope = orders.bind(&ctx);

    let foreign = ReadQuery::<order::Entity>::find()
        .filter(Condition::all().add(order::Column::Number.eq("globex-1")));
    assert!(scope.find_one(&f.db, foreign).await.unwrap().is_none());

    let own = ReadQuery::<order::Entity>::find()
        .filter(Condition::all().add(order::Column::Number.eq("acme-1")));
    let found = scope.find_one(&f.db, own).await.unwrap().unwrap();
    assert_eq!(found.id, f.acme.order);
}

#[tokio::test]
async fn existence_probes_see_every_account() {
    let f = fixture().await;
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);

    let probe = ReadQuery::<user::Entity>::existence_probe(
        Condition::all().add(user::Column::Email.eq("globex@example.com")),
    );
    assert!(users.bind(&ctx).exists(&f.db, probe).await.unwrap());

    let plain = ReadQuery::<user::Entity>::find()
        .filter(Condition::all().add(user::Column::Email.eq("globex@example.com")));
    assert!(!users.bind(&ctx).exists(&f.db, plain).await.unwrap());
}

#[tokio::test]
async fn non_primary_queries_pass_through() {
    let f = fixture().await;
    let orders = f.tenancy.table::<order::Entity>().unwrap();
    let ctx = anonymous_ctx();

    let query = ReadQuery::<order::Entity>::find();
    let expected = query.build(sea_orm::DbBackend::Sqlite);
    let scoped = orders
        .bind(&ctx)
        .scope(query, Origin::Association)
        .await
        .unwrap();

    assert_eq!(scoped.build(sea_orm::DbBackend::Sqlite), expected);
    assert_eq!(scoped.all(&f.db).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reads_without_identity_require_an_account() {
    let f = fixture().await;
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = anonymous_ctx();

    let err = users
        .bind(&ctx)
        .find_all(&f.db, ReadQuery::find())
        .await
        .unwrap_err();

    assert_eq!(err, TenancyError::account_required("users"));
}

#[tokio::test]
async fn reads_follow_explicit_selection() {
    let f = fixture().await;
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);
    f.tenancy
        .resolver()
        .store()
        .add_member(f.globex.account.id, f.acme.member)
        .await
        .unwrap();

    f.tenancy
        .resolver()
        .select(&ctx, f.globex.account.id)
        .await
        .unwrap();
    let rows = users
        .bind(&ctx)
        .find_all(&f.db, ReadQuery::find())
        .await
        .unwrap();

    assert_eq!(ids(&rows, |u| u.id), HashSet::from([f.globex.user]));
}

#[tokio::test]
async fn direct_auto_link_fills_only_the_account_column() {
    let f = fixture().await;
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);
    let mut scope = users.bind(&ctx);

    let mut model = user::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        email: ActiveValue::Set("new@example.com".to_owned()),
        ..Default::default()
    };
    let outcome = scope
        .auto_link(&f.db, &mut model, Origin::Primary)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Linked {
            column: "account_id".to_owned()
        }
    );
    assert_eq!(model.account_id, ActiveValue::Set(Some(f.acme.account.id)));
    assert_eq!(model.email, ActiveValue::Set("new@example.com".to_owned()));

    let again = scope
        .auto_link(&f.db, &mut model, Origin::Primary)
        .await
        .unwrap();
    assert!(matches!(again, LinkOutcome::AlreadySet { .. }));
    assert_eq!(model.account_id, ActiveValue::Set(Some(f.acme.account.id)));
}

#[tokio::test]
async fn associated_auto_link_uses_the_accounts_row() {
    let f = fixture().await;
    let orders = f.tenancy.table::<order::Entity>().unwrap();
    let ctx = ctx_for(f.globex.member);

    let mut model = order::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        number: ActiveValue::Set("globex-2".to_owned()),
        ..Default::default()
    };
    let outcome = orders
        .bind(&ctx)
        .auto_link(&f.db, &mut model, Origin::Primary)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Linked {
            column: "user_id".to_owned()
        }
    );
    assert_eq!(model.user_id, ActiveValue::Set(Some(f.globex.user)));
}

#[tokio::test]
async fn populated_foreign_key_is_not_overwritten() {
    let f = fixture().await;
    let orders = f.tenancy.table::<order::Entity>().unwrap();
    let ctx = ctx_for(f.globex.member);

    let mut model = order::ActiveModel {
        user_id: ActiveValue::Set(Some(f.acme.user)),
        ..Default::default()
    };
    let outcome = orders
        .bind(&ctx)
        .auto_link(&f.db, &mut model, Origin::Primary)
        .await
        .unwrap();

    assert!(matches!(outcome, LinkOutcome::AlreadySet { .. }));
    assert_eq!(model.user_id, ActiveValue::Set(Some(f.acme.user)));
}

#[tokio::test]
async fn deep_paths_and_internal_saves_are_not_linked() {
    let f = fixture().await;
    let items = f.tenancy.table::<order_item::Entity>().unwrap();
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = ctx_for(f.acme.member);

    let mut item = order_item::ActiveModel::default();
    let outcome = items
        .bind(&ctx)
        .auto_link(&f.db, &mut item, Origin::Primary)
        .await
        .unwrap();
    assert_eq!(outcome, LinkOutcome::Skipped(LinkSkip::DeepAssociation));
    assert!(item.order_id.is_not_set());

    let mut model = user::ActiveModel::default();
    let outcome = users
        .bind(&ctx)
        .auto_link(&f.db, &mut model, Origin::Association)
        .await
        .unwrap();
    assert_eq!(outcome, LinkOutcome::Skipped(LinkSkip::NotPrimary));
    assert!(model.account_id.is_not_set());
}

#[tokio::test]
async fn auto_link_without_identity_is_a_no_op() {
    let f = fixture().await;
    let users = f.tenancy.table::<user::Entity>().unwrap();
    let ctx = anonymous_ctx();

    let mut model = user::ActiveModel::default();
    let outcome = users
        .bind(&ctx)
        .auto_link(&f.db, &mut model, Origin::Primary)
        .await
        .unwrap();

    assert_eq!(outcome, LinkOutcome::Skipped(LinkSkip::NoAccount));
    assert!(model.account_id.is_not_set());
}

#[tokio::test]
async fn unknown_association_is_rejected_when_building_hooks() {
    let db = setup_db().await;
    let config = TenancyConfig::default().with_table(
        "orders",
        TableTenancyConfig::with_account_field("Customers.account_id"),
    );
    let tenancy = AccountTenancy::new(config, store(&db), shop_catalog()).unwrap();

    let err = tenancy.table::<order::Entity>().err().unwrap();
    assert_eq!(
        err,
        TenancyError::UnknownAssociation {
            table: "orders".to_owned(),
            association: "Customers".to_owned(),
        }
    );
}
