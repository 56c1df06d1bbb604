use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Expense, ExpenseKind, ResultLedger, expenses, groups, request_paid, requests, splits,
};

use super::{Ledger, normalize_required_text, with_tx};

impl Ledger {
    /// Records an expense or settlement against a group.
    ///
    /// A regular expense raises the group's running total; a settlement does
    /// not. When the expense is linked to a request that still exists, the
    /// payer joins that request's paid roster. A dangling `request_id` is
    /// kept verbatim; the roster update is simply skipped.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_expense(
        &self,
        group_id: &str,
        title: &str,
        amount: f64,
        paid_by: &str,
        split_with: &[String],
        kind: ExpenseKind,
        request_id: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<Expense> {
        let title = normalize_required_text(title, "expense title")?;
        let expense = Expense::new(
            group_id.to_string(),
            request_id.map(ToString::to_string),
            title,
            amount,
            paid_by.to_string(),
            split_with.to_vec(),
            kind,
            occurred_at,
        )?;

        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            for (position, user_id) in expense.split_with.iter().enumerate() {
                splits::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4().to_string()),
                    expense_id: ActiveValue::Set(expense.id.clone()),
                    position: ActiveValue::Set(position as i32),
                    user_id: ActiveValue::Set(user_id.clone()),
                }
                .insert(&db_tx)
                .await?;
            }

            if expense.kind == ExpenseKind::Expense {
                groups::ActiveModel {
                    id: ActiveValue::Set(group.id.clone()),
                    total_expenses: ActiveValue::Set(group.total_expenses + expense.amount),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }

            if let Some(request_id) = &expense.request_id {
                self.credit_request_payer(&db_tx, request_id, &expense.paid_by)
                    .await?;
            }

            Ok(expense)
        })
    }

    /// Marks the payer on the request's paid roster, once. The roster only
    /// ever grows; a missing request means the link is dangling and there is
    /// nothing to mark.
    async fn credit_request_payer(
        &self,
        db_tx: &DatabaseTransaction,
        request_id: &str,
        payer_id: &str,
    ) -> ResultLedger<()> {
        let request = requests::Entity::find_by_id(request_id.to_string())
            .one(db_tx)
            .await?;
        if request.is_none() {
            return Ok(());
        }
        let existing = request_paid::Entity::find_by_id((
            request_id.to_string(),
            payer_id.to_string(),
        ))
        .one(db_tx)
        .await?;
        if existing.is_none() {
            request_paid::ActiveModel {
                request_id: ActiveValue::Set(request_id.to_string()),
                user_id: ActiveValue::Set(payer_id.to_string()),
            }
            .insert(db_tx)
            .await?;
        }
        Ok(())
    }

    /// Deletes an expense and its split rows, deducting the amount from the
    /// group total (floored at zero). Paid rosters are never retracted, and a
    /// missing group row is tolerated so cascades can interleave.
    pub async fn delete_expense(&self, expense_id: &str) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id).await?;
            let kind = model
                .kind
                .as_deref()
                .map(ExpenseKind::try_from)
                .transpose()?
                .unwrap_or_default();

            splits::Entity::delete_many()
                .filter(splits::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;

            if kind == ExpenseKind::Expense {
                let group = groups::Entity::find_by_id(model.group_id.clone())
                    .one(&db_tx)
                    .await?;
                if let Some(group) = group {
                    groups::ActiveModel {
                        id: ActiveValue::Set(group.id.clone()),
                        total_expenses: ActiveValue::Set(
                            (group.total_expenses - model.amount).max(0.0),
                        ),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
            }
            Ok(())
        })
    }

    pub(super) async fn fetch_group_expenses(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
        request_id: Option<&str>,
    ) -> ResultLedger<Vec<Expense>> {
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.to_string()));
        if let Some(request_id) = request_id {
            query = query.filter(expenses::Column::RequestId.eq(request_id.to_string()));
        }
        let rows = query
            .order_by_desc(expenses::Column::OccurredAt)
            .all(db_tx)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let expense_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let split_rows = splits::Entity::find()
            .filter(splits::Column::ExpenseId.is_in(expense_ids))
            .order_by_asc(splits::Column::Position)
            .all(db_tx)
            .await?;
        let mut splits_by_expense: HashMap<String, Vec<String>> = HashMap::new();
        for row in split_rows {
            splits_by_expense
                .entry(row.expense_id)
                .or_default()
                .push(row.user_id);
        }

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut expense = Expense::try_from(row)?;
            expense.split_with = splits_by_expense.remove(&expense.id).unwrap_or_default();
            out.push(expense);
        }
        Ok(out)
    }

    /// Lists a group's expenses, newest first, optionally narrowed to one
    /// request.
    pub async fn group_expenses(
        &self,
        group_id: &str,
        request_id: Option<&str>,
    ) -> ResultLedger<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.fetch_group_expenses(&db_tx, group_id, request_id).await
        })
    }

    /// Return an [`Expense`] with its split roster.
    pub async fn expense(&self, expense_id: &str) -> ResultLedger<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, expense_id).await?;
            let split_rows = splits::Entity::find()
                .filter(splits::Column::ExpenseId.eq(expense_id.to_string()))
                .order_by_asc(splits::Column::Position)
                .all(&db_tx)
                .await?;
            let mut expense = Expense::try_from(model)?;
            expense.split_with = split_rows.into_iter().map(|row| row.user_id).collect();
            Ok(expense)
        })
    }
}
