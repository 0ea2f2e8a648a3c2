//! Group and participant endpoints.

use api_types::group::{
    BalanceView, BalancesResponse, GroupNew, GroupView, ParticipantNew, ParticipantView,
    ParticipantsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn group_view(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        invite_code: group.invite_code,
        owner: group.owner,
        created_at: group.created_at.fixed_offset(),
    }
}

fn participant_view(participant: engine::Participant) -> ParticipantView {
    ParticipantView {
        id: participant.id,
        name: participant.name,
        user_id: participant.user_id,
        is_admin: participant.is_admin,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<Json<GroupView>, ServerError> {
    let members: Vec<&str> = payload.members.iter().map(String::as_str).collect();
    let group = state
        .engine
        .create_group(&payload.name, &user.username, &members)
        .await?;
    Ok(Json(group_view(group)))
}

pub async fn list_participants(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ParticipantsResponse>, ServerError> {
    let participants = state
        .engine
        .participants(group_id, &user.username)
        .await?
        .into_iter()
        .map(participant_view)
        .collect();
    Ok(Json(ParticipantsResponse { participants }))
}

pub async fn add_participant(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ParticipantNew>,
) -> Result<Json<ParticipantView>, ServerError> {
    let participant = state
        .engine
        .add_participant(
            group_id,
            &payload.name,
            payload.user_id.as_deref(),
            &user.username,
        )
        .await?;
    Ok(Json(participant_view(participant)))
}

pub async fn balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let mut balances: Vec<BalanceView> = state
        .engine
        .group_balances(group_id, &user.username)
        .await?
        .into_iter()
        .map(|(participant_id, amount)| BalanceView {
            participant_id,
            amount_minor: amount.minor(),
        })
        .collect();
    balances.sort_by_key(|b| b.participant_id);
    Ok(Json(BalancesResponse { balances }))
}
