use account_tenancy_sdk::Account;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub is_active: bool,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_membership::Entity")]
    Memberships,
}

impl ActiveModelBehavior for ActiveModel {}

impl Related<super::account_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl From<Model> for Account {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            is_active: m.is_active,
            name: m.name,
            created: m.created,
            modified: m.modified,
            accessed: m.accessed,
        }
    }
}
