use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{Group, LedgerError, ResultLedger, User, group_members, groups, requests};

use super::{Ledger, normalize_optional_text, normalize_required_text, with_tx};

/// Outcome of [`Ledger::add_member`].
///
/// Adding someone who is already in the group is advisory, not an error; the
/// caller may surface it to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberAddition {
    Added,
    AlreadyMember,
}

fn member_row(group_id: &str, user: &User, position: i32) -> group_members::ActiveModel {
    group_members::ActiveModel {
        group_id: ActiveValue::Set(group_id.to_string()),
        user_id: ActiveValue::Set(user.id.clone()),
        name: ActiveValue::Set(user.name.clone()),
        email: ActiveValue::Set(user.email.clone()),
        avatar: ActiveValue::Set(user.avatar.clone()),
        position: ActiveValue::Set(position),
    }
}

impl Ledger {
    pub(super) async fn group_snapshot(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
    ) -> ResultLedger<Group> {
        let model = self.require_group(db_tx, group_id).await?;
        let member_rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .order_by_asc(group_members::Column::Position)
            .all(db_tx)
            .await?;

        let members: Vec<User> = member_rows.into_iter().map(User::from).collect();
        let member_ids = members.iter().map(|m| m.id.clone()).collect();
        Ok(Group {
            id: model.id,
            name: model.name,
            image: model.image,
            members,
            member_ids,
            total_expenses: model.total_expenses,
            created_by: model.created_by,
        })
    }

    /// Creates a group; the creator becomes its sole member and owner.
    pub async fn create_group(
        &self,
        name: &str,
        image: Option<&str>,
        creator: &User,
    ) -> ResultLedger<Group> {
        let name = normalize_required_text(name, "group name")?;
        let image = normalize_optional_text(image);
        let group_id = Uuid::new_v4().to_string();

        with_tx!(self, |db_tx| {
            groups::ActiveModel {
                id: ActiveValue::Set(group_id.clone()),
                name: ActiveValue::Set(name.clone()),
                image: ActiveValue::Set(image.clone()),
                total_expenses: ActiveValue::Set(0.0),
                created_by: ActiveValue::Set(creator.id.clone()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            member_row(&group_id, creator, 0).insert(&db_tx).await?;

            self.group_snapshot(&db_tx, &group_id).await
        })
    }

    /// Return a [`Group`] with its ordered members.
    pub async fn group(&self, group_id: &str) -> ResultLedger<Group> {
        with_tx!(self, |db_tx| self.group_snapshot(&db_tx, group_id).await)
    }

    /// Lists the groups a user belongs to (the "member ids contain user"
    /// filtered scan backing live group lists).
    pub async fn groups_for_user(&self, user_id: &str) -> ResultLedger<Vec<Group>> {
        with_tx!(self, |db_tx| {
            let rows = group_members::Entity::find()
                .filter(group_members::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                out.push(self.group_snapshot(&db_tx, &row.group_id).await?);
            }
            Ok(out)
        })
    }

    /// Adds a user to a group, snapshotting their profile into the member
    /// roster. Both the roster and its id projection come from the same row,
    /// so they move together.
    pub async fn add_member(&self, group_id: &str, user: &User) -> ResultLedger<MemberAddition> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            let existing =
                group_members::Entity::find_by_id((group_id.to_string(), user.id.clone()))
                    .one(&db_tx)
                    .await?;
            if existing.is_some() {
                return Ok(MemberAddition::AlreadyMember);
            }

            let next_position = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .order_by_desc(group_members::Column::Position)
                .one(&db_tx)
                .await?
                .map_or(0, |row| row.position + 1);

            member_row(group_id, user, next_position)
                .insert(&db_tx)
                .await?;
            Ok(MemberAddition::Added)
        })
    }

    /// Removes a member from the group roster.
    ///
    /// Historical expenses referencing the member as payer or split
    /// participant are left untouched; their contribution to balances
    /// remains. There is no settlement-lock on removal.
    pub async fn remove_member(&self, group_id: &str, member_id: &str) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            group_members::Entity::delete_by_id((group_id.to_string(), member_id.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Deletes a group by cascading through its requests and their expenses,
    /// then sweeping any surviving expense rows, then dropping the group.
    ///
    /// The cascade is an ordered list of idempotent steps, not one wrapping
    /// transaction: a failure partway leaves already-deleted children
    /// deleted, and re-running the cascade from scratch is safe.
    pub async fn delete_group(&self, group_id: &str) -> ResultLedger<()> {
        let request_ids = with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let rows = requests::Entity::find()
                .filter(requests::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;
            Ok::<_, LedgerError>(rows.into_iter().map(|r| r.id).collect::<Vec<_>>())
        })?;

        tracing::debug!(group_id, requests = request_ids.len(), "deleting group");

        for request_id in &request_ids {
            match self.delete_request(request_id).await {
                Ok(()) | Err(LedgerError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        // Requests and their expenses are gone; sweep whatever expense rows
        // survived (general expenses and stragglers). The group row goes last
        // so the sweep can be replayed.
        with_tx!(self, |db_tx| {
            let backend = db_tx.get_database_backend();
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expense_splits WHERE expense_id IN \
                     (SELECT id FROM expenses WHERE group_id = ?);",
                    vec![group_id.into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expenses WHERE group_id = ?;",
                    vec![group_id.into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM group_members WHERE group_id = ?;",
                    vec![group_id.into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM groups WHERE id = ?;",
                    vec![group_id.into()],
                ))
                .await?;
            Ok(())
        })
    }
}
