//! Badge endpoints.

use api_types::badge::{AwardView, AwardsResponse, BadgeView, BadgesResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn award_view(award: engine::BadgeAward) -> AwardView {
    AwardView {
        user_id: award.user_id,
        condition_code: award.condition_code,
        group_id: award.group_id,
        awarded_at: award.awarded_at.fixed_offset(),
    }
}

pub async fn catalog(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BadgesResponse>, ServerError> {
    let badges = state
        .engine
        .list_badges()
        .await?
        .into_iter()
        .map(|badge| BadgeView {
            name: badge.name,
            description: badge.description,
            kind: badge.kind,
            condition_code: badge.condition_code,
        })
        .collect();
    Ok(Json(BadgesResponse { badges }))
}

pub async fn awards(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<AwardsResponse>, ServerError> {
    let awards = state
        .engine
        .list_awards(group_id, &user.username)
        .await?
        .into_iter()
        .map(award_view)
        .collect();
    Ok(Json(AwardsResponse { awards }))
}

pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<AwardsResponse>, ServerError> {
    let awards = state
        .engine
        .recompute_weekly_badges(group_id, &user.username)
        .await?
        .into_iter()
        .map(award_view)
        .collect();
    Ok(Json(AwardsResponse { awards }))
}
