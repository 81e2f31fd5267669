use sea_orm_migration::prelude as mig;

const ACCOUNTS: &str = "accounts";
const ACCOUNT_MEMBERSHIPS: &str = "account_memberships";

pub struct Migration;

impl mig::MigrationName for Migration {
    fn name(&self) -> &'static str {
        "m20241030_000001_initial"
    }
}

fn alias(name: &str) -> mig::Alias {
    mig::Alias::new(name)
}

#[async_trait::async_trait]
impl mig::MigrationTrait for Migration {
    async fn up(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .create_table(
                mig::Table::create()
                    .table(alias(ACCOUNTS))
                    .if_not_exists()
                    .col(
                        mig::ColumnDef::new(alias("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        mig::ColumnDef::new(alias("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        mig::ColumnDef::new(alias("name"))
                            .string_len(255)
                            .not_null(),
                    )
                    .col(mig::ColumnDef::new(alias("created")).timestamp_with_time_zone())
                    .col(mig::ColumnDef::new(alias("modified")).timestamp_with_time_zone())
                    .col(mig::ColumnDef::new(alias("accessed")).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                mig::Table::create()
                    .table(alias(ACCOUNT_MEMBERSHIPS))
                    .if_not_exists()
                    .col(
                        mig::ColumnDef::new(alias("account_id"))
                            .uuid()
                            .not_null(),
                    )
                    .col(mig::ColumnDef::new(alias("user_id")).uuid().not_null())
                    .primary_key(
                        mig::Index::create()
                            .col(alias("account_id"))
                            .col(alias("user_id")),
                    )
                    .foreign_key(
                        mig::ForeignKey::create()
                            .name("fk_account_memberships_account")
                            .from(alias(ACCOUNT_MEMBERSHIPS), alias("account_id"))
                            .to(alias(ACCOUNTS), alias("id"))
                            .on_update(mig::ForeignKeyAction::Cascade)
                            .on_delete(mig::ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                mig::Index::create()
                    .name("idx_account_memberships_user_id")
                    .table(alias(ACCOUNT_MEMBERSHIPS))
                    .col(alias("user_id"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .drop_table(
                mig::Table::drop()
                    .table(alias(ACCOUNT_MEMBERSHIPS))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(mig::Table::drop().table(alias(ACCOUNTS)).to_owned())
            .await
    }
}
