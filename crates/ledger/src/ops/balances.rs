//! Derived balances and aggregate repair.
//!
//! Balances are never stored. Each read replays the group's full transaction
//! history: the payer is credited the whole amount and every split member is
//! debited an equal share. Settlements flow through the same walk, which is
//! what makes them cancel debt.

use std::collections::HashMap;

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{ExpenseKind, ResultLedger, expenses, group_members, groups, request_paid};

use super::{Ledger, with_tx};

impl Ledger {
    /// Computes per-member net balances for a group, optionally narrowed to
    /// the expenses linked to one request.
    ///
    /// Positive means the group owes the member, negative means the member
    /// owes the group. Every current member appears, at 0 when they have no
    /// history; users removed from the group keep their entry whenever any
    /// surviving expense names them. Expenses with an empty split roster
    /// contribute nothing.
    pub async fn group_balances(
        &self,
        group_id: &str,
        request_id: Option<&str>,
    ) -> ResultLedger<HashMap<String, f64>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            let mut balances: HashMap<String, f64> = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|row| (row.user_id, 0.0))
                .collect();

            let history = self
                .fetch_group_expenses(&db_tx, group_id, request_id)
                .await?;
            for expense in &history {
                if expense.split_with.is_empty() {
                    continue;
                }
                let share = expense.amount / expense.split_with.len() as f64;
                *balances.entry(expense.paid_by.clone()).or_insert(0.0) += expense.amount;
                for member_id in &expense.split_with {
                    *balances.entry(member_id.clone()).or_insert(0.0) -= share;
                }
            }
            Ok(balances)
        })
    }

    /// Rebuilds a group's running total from its expense rows and persists
    /// it. Settlements are excluded, and the result is floored at zero like
    /// the incremental path.
    pub async fn recompute_group_total(&self, group_id: &str) -> ResultLedger<f64> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            let rows = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut total = 0.0;
            for row in &rows {
                let kind = row
                    .kind
                    .as_deref()
                    .map(ExpenseKind::try_from)
                    .transpose()?
                    .unwrap_or_default();
                if kind == ExpenseKind::Expense {
                    total += row.amount;
                }
            }
            let total = total.max(0.0);

            if total != group.total_expenses {
                tracing::info!(
                    group_id,
                    stored = group.total_expenses,
                    recomputed = total,
                    "group total reconciled"
                );
                groups::ActiveModel {
                    id: ActiveValue::Set(group.id.clone()),
                    total_expenses: ActiveValue::Set(total),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }
            Ok(total)
        })
    }

    /// Rebuilds a request's paid roster from the payers of its surviving
    /// linked expenses.
    ///
    /// This is strictly a repair for rosters damaged by hand edits. The live
    /// roster is deliberately stickier: it remembers payers whose expenses
    /// were later deleted, and this rewrite forgets them.
    pub async fn recompute_members_paid(&self, request_id: &str) -> ResultLedger<Vec<String>> {
        with_tx!(self, |db_tx| {
            self.require_request(&db_tx, request_id).await?;
            let rows = expenses::Entity::find()
                .filter(expenses::Column::RequestId.eq(request_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut payers: Vec<String> = Vec::new();
            for row in rows {
                if !payers.contains(&row.paid_by) {
                    payers.push(row.paid_by);
                }
            }

            request_paid::Entity::delete_many()
                .filter(request_paid::Column::RequestId.eq(request_id.to_string()))
                .exec(&db_tx)
                .await?;
            for user_id in &payers {
                request_paid::ActiveModel {
                    request_id: ActiveValue::Set(request_id.to_string()),
                    user_id: ActiveValue::Set(user_id.clone()),
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::info!(request_id, payers = payers.len(), "paid roster rebuilt");
            Ok(payers)
        })
    }
}
