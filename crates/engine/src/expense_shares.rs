//! Share allocations: one participant's stake in one expense.
//!
//! The raw input (`input_amount_minor` / `input_ratio_bp`) is kept next to
//! the computed `owed_minor` so an update can replace allocations wholesale.
//! The per-share `paid` flag is a legacy marker; the netting path ignores it.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyMinor;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub participant_id: Uuid,
    pub input_amount_minor: Option<i64>,
    pub input_ratio_bp: Option<i64>,
    pub owed_minor: i64,
    pub paid: bool,
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ParticipantId",
        to = "super::participants::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Participant,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Domain view of one share allocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub participant_id: Uuid,
    pub input_amount: Option<MoneyMinor>,
    pub input_ratio_bp: Option<i64>,
    pub owed: MoneyMinor,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Model> for Share {
    fn from(model: Model) -> Self {
        Self {
            participant_id: model.participant_id,
            input_amount: model.input_amount_minor.map(MoneyMinor::new),
            input_ratio_bp: model.input_ratio_bp,
            owed: MoneyMinor::new(model.owed_minor),
            paid: model.paid,
            paid_at: model.paid_at,
        }
    }
}
