//! Group membership rows.
//!
//! Each row snapshots the member's profile at join time, mirroring the
//! upstream store which embedded member objects in the group document.
//! Profile updates do not rewrite snapshots. `position` preserves insertion
//! order, which is the membership order callers observe.

use sea_orm::entity::prelude::*;

use crate::User;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub position: i32,
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
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.user_id,
            name: model.name,
            email: model.email,
            avatar: model.avatar,
        }
    }
}
