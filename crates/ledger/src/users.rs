//! Users table and the profile handed to callers.
//!
//! The ledger trusts the ids it is given; authentication happens outside.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile: immutable id plus display fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl User {
    /// Creates a profile with a fresh id. Without an explicit avatar a
    /// deterministic placeholder derived from the id is used.
    pub fn new(name: String, email: String, avatar: Option<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let avatar = avatar.unwrap_or_else(|| default_avatar(&id));
        Self {
            id,
            name,
            email,
            avatar,
        }
    }
}

pub(crate) fn default_avatar(user_id: &str) -> String {
    format!("https://i.pravatar.cc/150?u={user_id}")
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            avatar: model.avatar,
        }
    }
}
