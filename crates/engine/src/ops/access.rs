use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, groups, participants, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    /// The acting user must be linked to a participant of the group.
    pub(super) async fn require_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<participants::Model> {
        self.require_group(db, group_id).await?;
        participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id))
            .filter(participants::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::Forbidden("not a member of this group".to_string()))
    }

    /// A participant reference in a payload must belong to the group it is
    /// used in.
    pub(super) async fn require_participant_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        participant_id: Uuid,
    ) -> ResultEngine<participants::Model> {
        participants::Entity::find_by_id(participant_id)
            .filter(participants::Column::GroupId.eq(group_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::InvalidSplit("invalid participant".to_string()))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(())
    }
}
