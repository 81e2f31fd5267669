use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{NullOrdering, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use account_tenancy_sdk::{Account, AccountId, AccountStore, NewAccount, TenancyError, UserId};

use super::entity::account::{self, Entity as AccountEntity};
use super::entity::account_membership::{self, Entity as MembershipEntity};

/// `SeaORM` implementation of [`AccountStore`].
///
/// Expects the schema created by [`super::migrations::Migrator`].
#[derive(Clone)]
pub struct SeaOrmAccountStore {
    db: DatabaseConnection,
}

impl SeaOrmAccountStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_id(&self, account_id: AccountId) -> Result<Option<account::Model>, TenancyError> {
        AccountEntity::find_by_id(account_id)
            .one(&self.db)
            .await
            .map_err(|e| db_err("find account", &e))
    }
}

fn db_err(op: &str, e: &DbErr) -> TenancyError {
    error!(operation = op, error = %e, "Account store query failed");
    TenancyError::internal(format!("{op}: {e}"))
}

#[async_trait]
impl AccountStore for SeaOrmAccountStore {
    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: UserId) -> Result<Vec<Account>, TenancyError> {
        let accounts = AccountEntity::find()
            .inner_join(MembershipEntity)
            .filter(account_membership::Column::UserId.eq(user_id))
            .order_by_with_nulls(account::Column::Accessed, Order::Desc, NullOrdering::Last)
            .order_by_asc(account::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| db_err("find accounts by member", &e))?;

        Ok(accounts.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id_member(
        &self,
        account_id: AccountId,
        user_id: UserId,
    ) -> Result<Option<Account>, TenancyError> {
        let account = AccountEntity::find_by_id(account_id)
            .inner_join(MembershipEntity)
            .filter(account_membership::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| db_err("find account by member", &e))?;

        Ok(account.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn touch_accessed(&self, account_id: AccountId) -> Result<Account, TenancyError> {
        let current = self
            .find_by_id(account_id)
            .await?
            .ok_or(TenancyError::AccountNotFound { account_id })?;

        let now = Utc::now();
        let accessed = current.accessed.map_or(now, |previous| previous.max(now));

        let mut model: account::ActiveModel = current.into();
        model.accessed = ActiveValue::Set(Some(accessed));
        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| db_err("touch account", &e))?;

        debug!(accessed = %accessed, "Account access recorded");
        Ok(updated.into())
    }

    #[instrument(skip(self, account), fields(name = %account.name))]
    async fn create_for_member(
        &self,
        user_id: UserId,
        account: NewAccount,
    ) -> Result<Account, TenancyError> {
        account
            .validate()
            .map_err(|message| TenancyError::validation("name", message))?;

        let now = Utc::now();
        let model = account::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            is_active: ActiveValue::Set(true),
            name: ActiveValue::Set(account.name),
            created: ActiveValue::Set(Some(now)),
            modified: ActiveValue::Set(Some(now)),
            accessed: ActiveValue::Set(None),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_err("begin transaction", &e))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| db_err("insert account", &e))?;

        MembershipEntity::insert(account_membership::ActiveModel {
            account_id: ActiveValue::Set(created.id),
            user_id: ActiveValue::Set(user_id),
        })
        .exec_without_returning(&txn)
        .await
        .map_err(|e| db_err("insert membership", &e))?;

        txn.commit()
            .await
            .map_err(|e| db_err("commit transaction", &e))?;

        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn add_member(&self, account_id: AccountId, user_id: UserId) -> Result<(), TenancyError> {
        if self.find_by_id(account_id).await?.is_none() {
            return Err(TenancyError::AccountNotFound { account_id });
        }

        MembershipEntity::insert(account_membership::ActiveModel {
            account_id: ActiveValue::Set(account_id),
            user_id: ActiveValue::Set(user_id),
        })
        .on_conflict(
            OnConflict::columns([
                account_membership::Column::AccountId,
                account_membership::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(|e| db_err("insert membership", &e))?;

        Ok(())
    }
}
