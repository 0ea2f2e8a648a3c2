//! Group participants.
//!
//! A participant is scoped to one group and optionally linked to a global
//! user (`user_id = None` means a placeholder that nobody has claimed yet).
//! Participants are never deleted: past expenses reference them.
//!
//! `name_norm` holds the NFKC-folded lowercase name; a unique index on
//! `(group_id, name_norm)` enforces case-insensitive uniqueness per group.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub user_id: Option<String>,
    pub is_admin: bool,
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

/// Domain view of one participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl From<Model> for Participant {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            name: model.name,
            user_id: model.user_id,
            is_admin: model.is_admin,
        }
    }
}

/// Canonical form used for the per-group uniqueness check.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_case_and_whitespace() {
        assert_eq!(normalize_name("  Alice "), "alice");
        assert_eq!(normalize_name("BOB"), normalize_name("bob"));
    }
}
