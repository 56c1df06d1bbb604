//! Expense primitives.
//!
//! An `Expense` is an atomic financial transaction: one payer, an ordered
//! split roster, and a kind. A settlement is a direct payer-to-recipient
//! transfer recorded with exactly one split member; it reduces debt without
//! counting as consumption.
//!
//! Records are immutable once created; edits are modeled as delete plus
//! re-add by the caller.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    #[default]
    Expense,
    Settlement,
}

impl ExpenseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Settlement => "settlement",
        }
    }
}

impl TryFrom<&str> for ExpenseKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "settlement" => Ok(Self::Settlement),
            other => Err(LedgerError::InvalidArgument(format!(
                "invalid expense kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub group_id: String,
    /// Weak reference used for filtering; `None` means a general group-level
    /// expense not tied to any request.
    pub request_id: Option<String>,
    pub title: String,
    pub amount: f64,
    pub paid_by: String,
    pub split_with: Vec<String>,
    pub kind: ExpenseKind,
    pub occurred_at: DateTime<Utc>,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_id: String,
        request_id: Option<String>,
        title: String,
        amount: f64,
        paid_by: String,
        split_with: Vec<String>,
        kind: ExpenseKind,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidArgument(
                "amount must be > 0".to_string(),
            ));
        }
        if split_with.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "split must name at least one member".to_string(),
            ));
        }
        if kind == ExpenseKind::Settlement && split_with.len() != 1 {
            return Err(LedgerError::InvalidArgument(
                "settlement must have exactly one recipient".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            group_id,
            request_id,
            title,
            amount,
            paid_by,
            split_with,
            kind,
            occurred_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub request_id: Option<String>,
    pub title: String,
    pub amount: f64,
    pub paid_by: String,
    /// `None` predates the expense/settlement split and reads as `expense`.
    pub kind: Option<String>,
    pub occurred_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.clone()),
            group_id: ActiveValue::Set(expense.group_id.clone()),
            request_id: ActiveValue::Set(expense.request_id.clone()),
            title: ActiveValue::Set(expense.title.clone()),
            amount: ActiveValue::Set(expense.amount),
            paid_by: ActiveValue::Set(expense.paid_by.clone()),
            kind: ActiveValue::Set(Some(expense.kind.as_str().to_string())),
            occurred_at: ActiveValue::Set(expense.occurred_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = model
            .kind
            .as_deref()
            .map(ExpenseKind::try_from)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            request_id: model.request_id,
            title: model.title,
            amount: model.amount,
            paid_by: model.paid_by,
            split_with: Vec::new(),
            kind,
            occurred_at: model.occurred_at,
        })
    }
}
