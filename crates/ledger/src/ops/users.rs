use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{ResultLedger, User, users};

use super::{Ledger, normalize_optional_text, normalize_required_text, with_tx};

impl Ledger {
    /// Creates a user profile (the signup counterpart; credentials live with
    /// the identity collaborator).
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        avatar: Option<&str>,
    ) -> ResultLedger<User> {
        let name = normalize_required_text(name, "user name")?;
        let email = normalize_required_text(email, "email")?;
        let user = User::new(name, email, normalize_optional_text(avatar));

        let model = users::ActiveModel {
            id: ActiveValue::Set(user.id.clone()),
            name: ActiveValue::Set(user.name.clone()),
            email: ActiveValue::Set(user.email.clone()),
            avatar: ActiveValue::Set(user.avatar.clone()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            Ok(user)
        })
    }

    /// Updates name and optionally avatar on the user row.
    ///
    /// Member snapshots held by groups keep the values from join time; this
    /// mirrors the upstream application, which never rewrote embedded member
    /// objects on profile change.
    pub async fn update_user_profile(
        &self,
        user_id: &str,
        name: &str,
        avatar: Option<&str>,
    ) -> ResultLedger<User> {
        let name = normalize_required_text(name, "user name")?;
        let avatar = normalize_optional_text(avatar);
        with_tx!(self, |db_tx| {
            let current = self.require_user(&db_tx, user_id).await?;
            let avatar = avatar.clone().unwrap_or(current.avatar);
            let model = users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name.clone()),
                avatar: ActiveValue::Set(avatar),
                ..Default::default()
            };
            let updated = model.update(&db_tx).await?;
            Ok(User::from(updated))
        })
    }

    /// Looks up a user by email (first match), backing member search.
    pub async fn find_user_by_email(&self, email: &str) -> ResultLedger<Option<User>> {
        with_tx!(self, |db_tx| {
            let row = users::Entity::find()
                .filter(users::Column::Email.eq(email.to_string()))
                .one(&db_tx)
                .await?;
            Ok(row.map(User::from))
        })
    }

    /// Return a [`User`] by id.
    pub async fn user(&self, user_id: &str) -> ResultLedger<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            Ok(User::from(model))
        })
    }
}
