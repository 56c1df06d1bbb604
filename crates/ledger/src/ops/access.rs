use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{LedgerError, ResultLedger, expenses, groups, requests, users};

use super::Ledger;

impl Ledger {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultLedger<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("user not exists".to_string()))
    }

    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
    ) -> ResultLedger<groups::Model> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("group not exists".to_string()))
    }

    pub(super) async fn require_request(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
    ) -> ResultLedger<requests::Model> {
        requests::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("request not exists".to_string()))
    }

    pub(super) async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: &str,
    ) -> ResultLedger<expenses::Model> {
        expenses::Entity::find_by_id(expense_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("expense not exists".to_string()))
    }
}
