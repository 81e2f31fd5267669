use sea_orm_migration::{MigrationTrait, MigratorTrait};

mod m20241030_000001_initial;

/// Schema migrations of the `account_tenancy` module.
pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241030_000001_initial::Migration)]
    }
}
