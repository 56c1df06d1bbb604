//! Groups: a named set of users sharing a running expense ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::User;

/// A group assembled from its row plus its ordered member snapshots.
///
/// `member_ids` is always the id projection of `members`; both views come
/// from the same membership rows, so they cannot drift apart.
///
/// `total_expenses` is a denormalized running sum over `expense`-kind records
/// only (settlements are transfers, not consumption). It is maintained
/// incrementally and floored at zero; see
/// [`Ledger::recompute_group_total`](crate::Ledger::recompute_group_total)
/// for the repair path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub members: Vec<User>,
    pub member_ids: Vec<String>,
    pub total_expenses: f64,
    pub created_by: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub total_expenses: f64,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_members::Entity")]
    GroupMembers,
    #[sea_orm(has_many = "super::requests::Entity")]
    Requests,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::group_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMembers.def()
    }
}

impl Related<super::requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
