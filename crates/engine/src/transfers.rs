//! Transfer instructions produced by a netting run.
//!
//! Rows are never deleted, even after completion: they are the historical
//! record of who was told to pay whom. `batch` groups all instructions
//! produced by one netting run; `debt_updated_at` is stamped whenever a
//! netting run touches the row and is the reference time for speed badges.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyMinor;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub debtor_participant_id: Uuid,
    pub creditor_participant_id: Uuid,
    pub amount_minor: i64,
    pub completed: bool,
    pub completed_at: Option<DateTimeUtc>,
    pub debt_updated_at: Option<DateTimeUtc>,
    pub batch: String,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Domain view of one transfer instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub group_id: Uuid,
    pub debtor_participant_id: Uuid,
    pub creditor_participant_id: Uuid,
    pub amount: MoneyMinor,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub debt_updated_at: Option<DateTime<Utc>>,
    pub batch: String,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Transfer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            debtor_participant_id: model.debtor_participant_id,
            creditor_participant_id: model.creditor_participant_id,
            amount: MoneyMinor::new(model.amount_minor),
            completed: model.completed,
            completed_at: model.completed_at,
            debt_updated_at: model.debt_updated_at,
            batch: model.batch,
            created_at: model.created_at,
        }
    }
}
