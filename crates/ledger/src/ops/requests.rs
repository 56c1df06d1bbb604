use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    LedgerError, Request, ResultLedger, request_members, request_paid, requests,
    requests::DEFAULT_ICON,
};

use super::{Ledger, normalize_required_text, with_tx};

impl Ledger {
    async fn request_snapshot(
        &self,
        db_tx: &DatabaseTransaction,
        request_id: &str,
    ) -> ResultLedger<Request> {
        let model = self.require_request(db_tx, request_id).await?;
        self.assemble_request(db_tx, model).await
    }

    async fn assemble_request(
        &self,
        db_tx: &DatabaseTransaction,
        model: requests::Model,
    ) -> ResultLedger<Request> {
        let member_ids = request_members::Entity::find()
            .filter(request_members::Column::RequestId.eq(model.id.clone()))
            .order_by_asc(request_members::Column::Position)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|row| row.user_id)
            .collect();
        let members_paid = request_paid::Entity::find()
            .filter(request_paid::Column::RequestId.eq(model.id.clone()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|row| row.user_id)
            .collect();
        Ok(Request {
            id: model.id,
            group_id: model.group_id,
            title: model.title,
            icon: model.icon,
            created_by: model.created_by,
            member_ids,
            members_paid,
            total_amount: model.total_amount,
        })
    }

    /// Creates a request inside a group.
    ///
    /// The creator is always part of the roster, even when the caller leaves
    /// them out, and duplicate ids collapse to their first occurrence. Member
    /// ids are not checked against the group roster.
    pub async fn create_request(
        &self,
        group_id: &str,
        title: &str,
        icon: Option<&str>,
        creator_id: &str,
        member_ids: &[String],
    ) -> ResultLedger<Request> {
        let title = normalize_required_text(title, "request title")?;
        if member_ids.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "request needs at least one member".to_string(),
            ));
        }
        let icon = icon
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ICON)
            .to_string();

        let mut roster: Vec<String> = Vec::with_capacity(member_ids.len() + 1);
        for id in member_ids {
            if !roster.contains(id) {
                roster.push(id.clone());
            }
        }
        if !roster.iter().any(|id| id == creator_id) {
            roster.push(creator_id.to_string());
        }

        let request_id = Uuid::new_v4().to_string();
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            requests::ActiveModel {
                id: ActiveValue::Set(request_id.clone()),
                group_id: ActiveValue::Set(group_id.to_string()),
                title: ActiveValue::Set(title.clone()),
                icon: ActiveValue::Set(icon.clone()),
                created_by: ActiveValue::Set(creator_id.to_string()),
                total_amount: ActiveValue::Set(0.0),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            for (position, user_id) in roster.iter().enumerate() {
                request_members::ActiveModel {
                    request_id: ActiveValue::Set(request_id.clone()),
                    user_id: ActiveValue::Set(user_id.clone()),
                    position: ActiveValue::Set(position as i32),
                }
                .insert(&db_tx)
                .await?;
            }

            self.request_snapshot(&db_tx, &request_id).await
        })
    }

    /// Return a [`Request`] with its member and paid rosters.
    pub async fn request(&self, request_id: &str) -> ResultLedger<Request> {
        with_tx!(self, |db_tx| self.request_snapshot(&db_tx, request_id).await)
    }

    /// Lists a group's requests. An unknown group id yields an empty list,
    /// matching the filter-only query this backs.
    pub async fn group_requests(&self, group_id: &str) -> ResultLedger<Vec<Request>> {
        with_tx!(self, |db_tx| {
            let rows = requests::Entity::find()
                .filter(requests::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                out.push(self.assemble_request(&db_tx, row).await?);
            }
            Ok(out)
        })
    }

    /// Lists every request whose roster names the user, across groups.
    pub async fn requests_for_user(&self, user_id: &str) -> ResultLedger<Vec<Request>> {
        with_tx!(self, |db_tx| {
            let memberships = request_members::Entity::find()
                .filter(request_members::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(memberships.len());
            for membership in memberships {
                out.push(self.request_snapshot(&db_tx, &membership.request_id).await?);
            }
            Ok(out)
        })
    }

    /// Adds a user to a request roster; already present is a no-op.
    pub async fn add_member_to_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_request(&db_tx, request_id).await?;
            let existing = request_members::Entity::find_by_id((
                request_id.to_string(),
                user_id.to_string(),
            ))
            .one(&db_tx)
            .await?;
            if existing.is_none() {
                let next_position = request_members::Entity::find()
                    .filter(request_members::Column::RequestId.eq(request_id.to_string()))
                    .order_by_desc(request_members::Column::Position)
                    .one(&db_tx)
                    .await?
                    .map_or(0, |row| row.position + 1);
                request_members::ActiveModel {
                    request_id: ActiveValue::Set(request_id.to_string()),
                    user_id: ActiveValue::Set(user_id.to_string()),
                    position: ActiveValue::Set(next_position),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(())
        })
    }

    /// Drops a user from a request roster. The paid roster is untouched.
    pub async fn remove_member_from_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_request(&db_tx, request_id).await?;
            request_members::Entity::delete_by_id((
                request_id.to_string(),
                user_id.to_string(),
            ))
            .exec(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Deletes a request and every expense linked to it.
    ///
    /// Linked expenses go through [`Ledger::delete_expense`] one by one so
    /// each adjusts the group total; only then do the rosters and the request
    /// row fall. Like the group cascade, the steps are idempotent and safe to
    /// replay after a partial failure.
    pub async fn delete_request(&self, request_id: &str) -> ResultLedger<()> {
        let expense_ids = with_tx!(self, |db_tx| {
            self.require_request(&db_tx, request_id).await?;
            let rows = crate::expenses::Entity::find()
                .filter(crate::expenses::Column::RequestId.eq(request_id.to_string()))
                .all(&db_tx)
                .await?;
            Ok::<_, LedgerError>(rows.into_iter().map(|r| r.id).collect::<Vec<_>>())
        })?;

        tracing::debug!(request_id, expenses = expense_ids.len(), "deleting request");

        for expense_id in &expense_ids {
            match self.delete_expense(expense_id).await {
                Ok(()) | Err(LedgerError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        with_tx!(self, |db_tx| {
            request_members::Entity::delete_many()
                .filter(request_members::Column::RequestId.eq(request_id.to_string()))
                .exec(&db_tx)
                .await?;
            request_paid::Entity::delete_many()
                .filter(request_paid::Column::RequestId.eq(request_id.to_string()))
                .exec(&db_tx)
                .await?;
            requests::Entity::delete_by_id(request_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
