//! Expense creation and update.
//!
//! Both operations run inside one DB transaction: validation happens before
//! any write, and a failure leaves no partial share rows behind.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, MoneyMinor, ResultEngine, ShareInput, SplitPolicy, compute_shares,
    expense_shares, expenses,
};

use super::{Engine, with_tx};

/// Partial update for an expense. `inputs = Some(..)` replaces the
/// allocation set wholesale; absent fields keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct ExpensePatch {
    pub title: Option<String>,
    pub total: Option<MoneyMinor>,
    pub split_policy: Option<SplitPolicy>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub inputs: Option<Vec<ShareInput>>,
}

impl Engine {
    /// Creates an expense together with its share allocations.
    ///
    /// `occurred_at` is the economic event time and may be backdated;
    /// it defaults to now.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_expense(
        &self,
        group_id: Uuid,
        payer_participant_id: Uuid,
        title: &str,
        total: MoneyMinor,
        policy: SplitPolicy,
        inputs: &[ShareInput],
        occurred_at: Option<DateTime<Utc>>,
        acting_user: &str,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;

            let payer = self
                .require_participant_in_group(&db_tx, group_id, payer_participant_id)
                .await
                .map_err(|_| EngineError::InvalidSplit("invalid payer participant".to_string()))?;
            for input in inputs {
                self.require_participant_in_group(&db_tx, group_id, input.participant_id)
                    .await?;
            }

            let shares = compute_shares(total, policy, payer.id, inputs)?;

            let expense = Expense {
                id: Uuid::new_v4(),
                group_id,
                payer_participant_id,
                title: title.to_string(),
                amount: total,
                split_policy: policy,
                settled: false,
                occurred_at: occurred_at.unwrap_or_else(Utc::now),
                created_by: acting_user.to_string(),
                shares: Vec::new(),
            };
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            self.insert_shares(&db_tx, expense.id, &shares).await?;

            self.load_expense(&db_tx, expense.id).await
        })
    }

    /// Applies a partial update; when `inputs` is present the allocations
    /// are deleted and recomputed from the effective total/policy.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        patch: ExpensePatch,
        acting_user: &str,
    ) -> ResultEngine<Expense> {
        if patch.total.is_some_and(|total| total.is_negative()) {
            return Err(EngineError::InvalidAmount(
                "total amount must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            self.require_group_member(&db_tx, model.group_id, acting_user)
                .await?;

            let total = patch.total.unwrap_or(MoneyMinor::new(model.amount_minor));
            let policy = match patch.split_policy {
                Some(policy) => policy,
                None => SplitPolicy::try_from(model.split_policy.as_str())?,
            };

            let mut active = expenses::ActiveModel {
                id: ActiveValue::Set(model.id),
                ..Default::default()
            };
            let mut dirty = false;
            if let Some(title) = &patch.title {
                active.title = ActiveValue::Set(title.clone());
                dirty = true;
            }
            if let Some(total) = patch.total {
                active.amount_minor = ActiveValue::Set(total.minor());
                dirty = true;
            }
            if let Some(policy) = patch.split_policy {
                active.split_policy = ActiveValue::Set(policy.as_str().to_string());
                dirty = true;
            }
            if let Some(occurred_at) = patch.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
                dirty = true;
            }
            // An update with no changed columns is rejected by the backend.
            if dirty {
                active.update(&db_tx).await?;
            }

            if let Some(inputs) = &patch.inputs {
                for input in inputs {
                    self.require_participant_in_group(&db_tx, model.group_id, input.participant_id)
                        .await?;
                }
                let shares = compute_shares(total, policy, model.payer_participant_id, inputs)?;

                expense_shares::Entity::delete_many()
                    .filter(expense_shares::Column::ExpenseId.eq(expense_id))
                    .exec(&db_tx)
                    .await?;
                self.insert_shares(&db_tx, expense_id, &shares).await?;
            }

            self.load_expense(&db_tx, expense_id).await
        })
    }

    /// Returns one expense with its allocations.
    pub async fn expense(&self, expense_id: Uuid, acting_user: &str) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            self.require_group_member(&db_tx, model.group_id, acting_user)
                .await?;
            self.load_expense(&db_tx, expense_id).await
        })
    }

    pub(super) async fn insert_shares(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        shares: &[(ShareInput, MoneyMinor)],
    ) -> ResultEngine<()> {
        for (input, owed) in shares {
            expense_shares::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                expense_id: ActiveValue::Set(expense_id),
                participant_id: ActiveValue::Set(input.participant_id),
                input_amount_minor: ActiveValue::Set(input.amount_minor.map(MoneyMinor::minor)),
                input_ratio_bp: ActiveValue::Set(input.ratio_bp),
                owed_minor: ActiveValue::Set(owed.minor()),
                paid: ActiveValue::Set(false),
                paid_at: ActiveValue::Set(None),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    pub(super) async fn load_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        let shares = expense_shares::Entity::find()
            .filter(expense_shares::Column::ExpenseId.eq(expense_id))
            .all(db)
            .await?;
        Expense::from_models(model, shares)
    }
}
