//! Expense endpoints.

use api_types::expense::{
    ExpenseNew, ExpenseUpdate, ExpenseView, ShareNew, ShareView, SplitPolicy as ApiPolicy,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_policy_in(policy: ApiPolicy) -> engine::SplitPolicy {
    match policy {
        ApiPolicy::Equal => engine::SplitPolicy::Equal,
        ApiPolicy::ExplicitAmount => engine::SplitPolicy::ExplicitAmount,
        ApiPolicy::Ratio => engine::SplitPolicy::Ratio,
    }
}

fn map_policy_out(policy: engine::SplitPolicy) -> ApiPolicy {
    match policy {
        engine::SplitPolicy::Equal => ApiPolicy::Equal,
        engine::SplitPolicy::ExplicitAmount => ApiPolicy::ExplicitAmount,
        engine::SplitPolicy::Ratio => ApiPolicy::Ratio,
    }
}

fn map_share_in(share: &ShareNew) -> engine::ShareInput {
    engine::ShareInput {
        participant_id: share.participant_id,
        amount_minor: share.amount_minor.map(engine::MoneyMinor::new),
        ratio_bp: share.ratio_bp,
    }
}

fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        group_id: expense.group_id,
        payer_participant_id: expense.payer_participant_id,
        title: expense.title,
        amount_minor: expense.amount.minor(),
        split_policy: map_policy_out(expense.split_policy),
        settled: expense.settled,
        occurred_at: expense.occurred_at.fixed_offset(),
        created_by: expense.created_by,
        shares: expense
            .shares
            .into_iter()
            .map(|share| ShareView {
                participant_id: share.participant_id,
                owed_minor: share.owed.minor(),
                paid: share.paid,
            })
            .collect(),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let inputs: Vec<engine::ShareInput> = payload.shares.iter().map(map_share_in).collect();
    let expense = state
        .engine
        .create_expense(
            payload.group_id,
            payload.payer_participant_id,
            &payload.title,
            engine::MoneyMinor::new(payload.amount_minor),
            map_policy_in(payload.split_policy),
            &inputs,
            payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
            &user.username,
        )
        .await?;
    Ok(Json(view(expense)))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(expense_id, &user.username).await?;
    Ok(Json(view(expense)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let patch = engine::ExpensePatch {
        title: payload.title,
        total: payload.amount_minor.map(engine::MoneyMinor::new),
        split_policy: payload.split_policy.map(map_policy_in),
        occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
        inputs: payload
            .shares
            .map(|shares| shares.iter().map(map_share_in).collect()),
    };
    let expense = state
        .engine
        .update_expense(expense_id, patch, &user.username)
        .await?;
    Ok(Json(view(expense)))
}
