//! Expense records: one shared cost each, plus the domain view used by the
//! ops layer.
//!
//! `occurred_at` is the economic event time (callers may backdate it); it is
//! independent of row-insert time. The `settled` flag excludes a record from
//! balance aggregation. Reimbursement expenses written by the
//! transfer-completion flow stay unsettled: their payer credit and sole
//! share offset the netted debt on the next aggregation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyMinor, SplitPolicy, expense_shares};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub payer_participant_id: Uuid,
    pub title: String,
    pub amount_minor: i64,
    pub split_policy: String,
    pub settled: bool,
    pub occurred_at: DateTimeUtc,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(has_many = "super::expense_shares::Entity")]
    Shares,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::expense_shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Domain view of an expense record with its share allocations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub payer_participant_id: Uuid,
    pub title: String,
    pub amount: MoneyMinor,
    pub split_policy: SplitPolicy,
    pub settled: bool,
    pub occurred_at: DateTime<Utc>,
    pub created_by: String,
    pub shares: Vec<expense_shares::Share>,
}

impl Expense {
    pub(crate) fn from_models(
        model: Model,
        share_models: Vec<expense_shares::Model>,
    ) -> Result<Self, EngineError> {
        let shares = share_models
            .into_iter()
            .map(expense_shares::Share::from)
            .collect();
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            payer_participant_id: model.payer_participant_id,
            title: model.title,
            amount: MoneyMinor::new(model.amount_minor),
            split_policy: SplitPolicy::try_from(model.split_policy.as_str())?,
            settled: model.settled,
            occurred_at: model.occurred_at,
            created_by: model.created_by,
            shares,
        })
    }
}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            group_id: ActiveValue::Set(expense.group_id),
            payer_participant_id: ActiveValue::Set(expense.payer_participant_id),
            title: ActiveValue::Set(expense.title.clone()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            split_policy: ActiveValue::Set(expense.split_policy.as_str().to_string()),
            settled: ActiveValue::Set(expense.settled),
            occurred_at: ActiveValue::Set(expense.occurred_at),
            created_by: ActiveValue::Set(expense.created_by.clone()),
        }
    }
}
