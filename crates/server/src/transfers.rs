//! Netting and transfer endpoints.

use api_types::transfer::{TransferView, TransfersResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(transfer: engine::Transfer) -> TransferView {
    TransferView {
        id: transfer.id,
        group_id: transfer.group_id,
        debtor_participant_id: transfer.debtor_participant_id,
        creditor_participant_id: transfer.creditor_participant_id,
        amount_minor: transfer.amount.minor(),
        completed: transfer.completed,
        completed_at: transfer.completed_at.map(|dt| dt.fixed_offset()),
        debt_updated_at: transfer.debt_updated_at.map(|dt| dt.fixed_offset()),
        batch: transfer.batch,
        created_at: transfer.created_at.fixed_offset(),
    }
}

/// Runs a netting pass and returns the reconciled instructions of this run.
pub async fn net(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<TransfersResponse>, ServerError> {
    let transfers = state
        .engine
        .net_group(group_id, &user.username)
        .await?
        .into_iter()
        .map(view)
        .collect();
    Ok(Json(TransfersResponse { transfers }))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<TransfersResponse>, ServerError> {
    let transfers = state
        .engine
        .list_transfers(group_id, &user.username)
        .await?
        .into_iter()
        .map(view)
        .collect();
    Ok(Json(TransfersResponse { transfers }))
}

pub async fn complete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transfer_id): Path<Uuid>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state
        .engine
        .complete_transfer(transfer_id, &user.username)
        .await?;
    Ok(Json(view(transfer)))
}
