//! Badge catalog.
//!
//! The catalog is a fixed set of rows keyed by a stable condition code; the
//! evaluator looks badges up by code and silently skips checks whose badge
//! is missing from the catalog.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "badges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub condition_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::badge_awards::Entity")]
    Awards,
}

impl Related<super::badge_awards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Awards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Domain view of one catalog entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BadgeDef {
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub condition_code: String,
}

impl From<Model> for BadgeDef {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            description: model.description,
            kind: model.kind,
            condition_code: model.condition_code,
        }
    }
}

/// Awarded instantly when a transfer is completed within the fast window.
pub const BADGE_FAST_SETTLER: &str = "fast_settler";
/// Awarded instantly when a transfer is completed after the slow threshold.
pub const BADGE_SLOW_SETTLER: &str = "slow_settler";
/// Weekly: largest single expense total paid by any one payer.
pub const BADGE_BIGGEST_PAYMENT: &str = "biggest_payment";
/// Weekly: smallest single expense total paid by any one payer.
pub const BADGE_SMALLEST_PAYMENT: &str = "smallest_payment";
/// Weekly: highest aggregate owed across the window.
pub const BADGE_TOP_SPENDER: &str = "top_spender";
/// Weekly: lowest non-zero aggregate owed across the window.
pub const BADGE_FRUGAL: &str = "frugal";

/// The recomputable weekly set, cleared before every recomputation.
pub const WEEKLY_BADGES: [&str; 4] = [
    BADGE_BIGGEST_PAYMENT,
    BADGE_SMALLEST_PAYMENT,
    BADGE_TOP_SPENDER,
    BADGE_FRUGAL,
];
