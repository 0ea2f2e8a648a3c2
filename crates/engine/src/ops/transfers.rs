//! Transfer completion.
//!
//! Completing an instruction is the only way its `completed` flag and
//! timestamp are ever set, and they are set exactly once. The completion
//! posts a reimbursement expense back into the ledger and refreshes the
//! group's outstanding instructions, all in one transaction under the
//! group's netting lock.

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ResultEngine, SplitPolicy, Transfer, expenses, transfers,
};

use super::{Engine, with_tx};

impl Engine {
    /// Marks a transfer as completed.
    ///
    /// Only the user behind the debtor or creditor participant may complete
    /// it. On success the speed-badge check runs, a reimbursement expense
    /// (payer = debtor, sole recipient = creditor) is appended, and the
    /// group is re-netted, all in the same transaction.
    pub async fn complete_transfer(
        &self,
        transfer_id: Uuid,
        acting_user: &str,
    ) -> ResultEngine<Transfer> {
        let group_id = transfers::Entity::find_by_id(transfer_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transfer not exists".to_string()))?
            .group_id;

        let lock = self.group_lock(group_id).await;
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            let row = transfers::Entity::find_by_id(transfer_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transfer not exists".to_string()))?;
            if row.completed {
                return Err(EngineError::InvalidAmount(
                    "transfer already completed".to_string(),
                ));
            }

            let debtor = self
                .require_participant_in_group(&db_tx, row.group_id, row.debtor_participant_id)
                .await?;
            let creditor = self
                .require_participant_in_group(&db_tx, row.group_id, row.creditor_participant_id)
                .await?;

            let is_debtor = debtor.user_id.as_deref() == Some(acting_user);
            let is_creditor = creditor.user_id.as_deref() == Some(acting_user);
            if !(is_debtor || is_creditor) {
                return Err(EngineError::Forbidden(
                    "not a participant in this transfer".to_string(),
                ));
            }

            let now = Utc::now();
            transfers::ActiveModel {
                id: ActiveValue::Set(row.id),
                completed: ActiveValue::Set(true),
                completed_at: ActiveValue::Set(Some(now)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            if let Some(debtor_user) = debtor.user_id.as_deref() {
                self.check_speed_badges(&db_tx, &row, now, debtor_user)
                    .await?;
            }

            // Fold the payment back into the ledger: the debtor is credited
            // the full amount and the creditor owes it, exactly offsetting
            // the netted debt on the next aggregation.
            let reimbursement = Expense {
                id: Uuid::new_v4(),
                group_id: row.group_id,
                payer_participant_id: row.debtor_participant_id,
                title: format!("{} reimbursed {}", debtor.name, creditor.name),
                amount: crate::MoneyMinor::new(row.amount_minor),
                split_policy: SplitPolicy::Equal,
                settled: false,
                occurred_at: now,
                created_by: acting_user.to_string(),
                shares: Vec::new(),
            };
            expenses::ActiveModel::from(&reimbursement)
                .insert(&db_tx)
                .await?;
            self.insert_reimbursement_share(
                &db_tx,
                reimbursement.id,
                row.creditor_participant_id,
                row.amount_minor,
                now,
            )
            .await?;

            // Re-net so outstanding instructions reflect the completed
            // transfer before anything is committed.
            self.reconcile_group(&db_tx, row.group_id).await?;

            let updated = transfers::Entity::find_by_id(row.id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transfer not exists".to_string()))?;
            Ok(Transfer::from(updated))
        })
    }

    async fn insert_reimbursement_share(
        &self,
        db: &sea_orm::DatabaseTransaction,
        expense_id: Uuid,
        creditor_participant_id: Uuid,
        amount_minor: i64,
        now: chrono::DateTime<Utc>,
    ) -> ResultEngine<()> {
        crate::expense_shares::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            expense_id: ActiveValue::Set(expense_id),
            participant_id: ActiveValue::Set(creditor_participant_id),
            input_amount_minor: ActiveValue::Set(None),
            input_ratio_bp: ActiveValue::Set(None),
            owed_minor: ActiveValue::Set(amount_minor),
            paid: ActiveValue::Set(true),
            paid_at: ActiveValue::Set(Some(now)),
        }
        .insert(db)
        .await?;
        Ok(())
    }
}
