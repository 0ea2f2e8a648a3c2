//! Badge awards keyed by (user, badge, group).
//!
//! A unique index on the triple plus conflict-ignoring inserts makes the
//! "award if not already held" primitive atomic.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "badge_awards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub badge_id: Uuid,
    pub group_id: Uuid,
    pub awarded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::badges::Entity",
        from = "Column::BadgeId",
        to = "super::badges::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Badge,
}

impl Related<super::badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Badge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Domain view of one award, including the badge's condition code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BadgeAward {
    pub user_id: String,
    pub condition_code: String,
    pub group_id: Uuid,
    pub awarded_at: DateTime<Utc>,
}
