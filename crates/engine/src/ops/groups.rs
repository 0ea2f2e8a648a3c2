//! Group and participant scaffolding.
//!
//! The netting core only needs groups and participants to exist; invite-code
//! join flows and session management stay with the calling layer.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Group, Participant, ResultEngine, groups, participants};

use super::{Engine, with_tx};

/// Invite codes are 8 uppercase alphanumeric characters drawn from a v4
/// UUID.
fn generate_invite_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

impl Engine {
    /// Creates a group owned by `owner` with one claimed participant for the
    /// owner plus a placeholder participant per extra name.
    pub async fn create_group(
        &self,
        name: &str,
        owner: &str,
        member_names: &[&str],
    ) -> ResultEngine<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidAmount(
                "group name must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, owner).await?;

            let group = groups::Model {
                id: Uuid::new_v4(),
                name: name.to_string(),
                invite_code: generate_invite_code(),
                owner: owner.to_string(),
                created_at: Utc::now(),
            };
            groups::ActiveModel {
                id: ActiveValue::Set(group.id),
                name: ActiveValue::Set(group.name.clone()),
                invite_code: ActiveValue::Set(group.invite_code.clone()),
                owner: ActiveValue::Set(group.owner.clone()),
                created_at: ActiveValue::Set(group.created_at),
            }
            .insert(&db_tx)
            .await?;

            self.insert_participant(&db_tx, group.id, owner, Some(owner), true)
                .await?;
            for member in member_names {
                self.insert_participant(&db_tx, group.id, member, None, false)
                    .await?;
            }

            Ok(Group::from(group))
        })
    }

    /// Adds a participant to a group, optionally already linked to a user.
    pub async fn add_participant(
        &self,
        group_id: Uuid,
        name: &str,
        user_id: Option<&str>,
        acting_user: &str,
    ) -> ResultEngine<Participant> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            if let Some(user) = user_id {
                self.require_user_exists(&db_tx, user).await?;
            }
            let model = self
                .insert_participant(&db_tx, group_id, name, user_id, false)
                .await?;
            Ok(Participant::from(model))
        })
    }

    /// Lists the participants of a group, stable by name.
    pub async fn participants(
        &self,
        group_id: Uuid,
        acting_user: &str,
    ) -> ResultEngine<Vec<Participant>> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            let rows = participants::Entity::find()
                .filter(participants::Column::GroupId.eq(group_id))
                .order_by_asc(participants::Column::NameNorm)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Participant::from).collect())
        })
    }

    async fn insert_participant(
        &self,
        db: &sea_orm::DatabaseTransaction,
        group_id: Uuid,
        name: &str,
        user_id: Option<&str>,
        is_admin: bool,
    ) -> ResultEngine<participants::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidAmount(
                "participant name must not be empty".to_string(),
            ));
        }
        let name_norm = participants::normalize_name(name);

        let duplicate = participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id))
            .filter(participants::Column::NameNorm.eq(name_norm.clone()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }

        let model = participants::Model {
            id: Uuid::new_v4(),
            group_id,
            name: name.to_string(),
            name_norm,
            user_id: user_id.map(ToString::to_string),
            is_admin,
        };
        participants::ActiveModel {
            id: ActiveValue::Set(model.id),
            group_id: ActiveValue::Set(model.group_id),
            name: ActiveValue::Set(model.name.clone()),
            name_norm: ActiveValue::Set(model.name_norm.clone()),
            user_id: ActiveValue::Set(model.user_id.clone()),
            is_admin: ActiveValue::Set(model.is_admin),
        }
        .insert(db)
        .await?;

        Ok(model)
    }
}
