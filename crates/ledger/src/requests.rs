//! Requests: named sub-ledgers scoping a subset of a group's transactions
//! (a trip, an event).
//!
//! A request references its owning group and carries two id sets: the member
//! roster and the paid roster. The paid roster records everyone who has been
//! the payer of at least one linked expense; deleting an expense never
//! retracts it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_ICON: &str = "documents-outline";

/// A request assembled from its row plus member and paid rosters.
///
/// `total_amount` is tracked but not authoritative; the upstream application
/// initializes it and never updates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub icon: String,
    pub created_by: String,
    pub member_ids: Vec<String>,
    pub members_paid: Vec<String>,
    pub total_amount: f64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub icon: String,
    pub created_by: String,
    pub total_amount: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Groups,
    #[sea_orm(has_many = "super::request_members::Entity")]
    RequestMembers,
    #[sea_orm(has_many = "super::request_paid::Entity")]
    RequestPaid,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::request_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestMembers.def()
    }
}

impl Related<super::request_paid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestPaid.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
