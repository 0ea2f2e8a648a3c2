//! Netting run: aggregate -> match -> reconcile.
//!
//! Reconciliation is idempotent by (debtor, creditor) pair: re-running the
//! netting with an unchanged ledger updates amounts in place and never
//! duplicates rows. Incomplete instructions whose pair dropped out of the
//! latest plan are left outstanding; a netting run never retracts rows
//! (see DESIGN.md).

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{ResultEngine, Transfer, netting::plan_transfers, transfers};

use super::{Engine, with_tx};

impl Engine {
    /// Runs a netting pass for the group and returns the reconciled
    /// instructions of this run.
    ///
    /// Serialized per group: two concurrent runs for the same group cannot
    /// race on the find-else-insert reconciliation.
    pub async fn net_group(&self, group_id: Uuid, acting_user: &str) -> ResultEngine<Vec<Transfer>> {
        let lock = self.group_lock(group_id).await;
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            self.reconcile_group(&db_tx, group_id).await
        })
    }

    /// Outstanding and completed instructions for a group, newest first.
    pub async fn list_transfers(
        &self,
        group_id: Uuid,
        acting_user: &str,
    ) -> ResultEngine<Vec<Transfer>> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            let rows = transfers::Entity::find()
                .filter(transfers::Column::GroupId.eq(group_id))
                .order_by_desc(transfers::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Transfer::from).collect())
        })
    }

    /// The aggregate -> match -> reconcile body, shared with the completion
    /// flow (which re-nets under its own lock and transaction).
    pub(super) async fn reconcile_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Transfer>> {
        let balances = self.fold_balances(db, group_id).await?;
        let plan = plan_transfers(&balances, self.config.netting_epsilon_minor);

        let batch = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut result = Vec::with_capacity(plan.len());

        for planned in plan {
            let existing = transfers::Entity::find()
                .filter(transfers::Column::GroupId.eq(group_id))
                .filter(transfers::Column::DebtorParticipantId.eq(planned.debtor_participant_id))
                .filter(
                    transfers::Column::CreditorParticipantId.eq(planned.creditor_participant_id),
                )
                .filter(transfers::Column::Completed.eq(false))
                .one(db)
                .await?;

            let id = match existing {
                Some(row) => {
                    transfers::ActiveModel {
                        id: ActiveValue::Set(row.id),
                        amount_minor: ActiveValue::Set(planned.amount.minor()),
                        debt_updated_at: ActiveValue::Set(Some(now)),
                        ..Default::default()
                    }
                    .update(db)
                    .await?;
                    row.id
                }
                None => {
                    let id = Uuid::new_v4();
                    transfers::ActiveModel {
                        id: ActiveValue::Set(id),
                        group_id: ActiveValue::Set(group_id),
                        debtor_participant_id: ActiveValue::Set(planned.debtor_participant_id),
                        creditor_participant_id: ActiveValue::Set(planned.creditor_participant_id),
                        amount_minor: ActiveValue::Set(planned.amount.minor()),
                        completed: ActiveValue::Set(false),
                        completed_at: ActiveValue::Set(None),
                        debt_updated_at: ActiveValue::Set(Some(now)),
                        batch: ActiveValue::Set(batch.clone()),
                        created_at: ActiveValue::Set(now),
                    }
                    .insert(db)
                    .await?;
                    id
                }
            };

            let row = transfers::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| crate::EngineError::KeyNotFound("transfer not exists".to_string()))?;
            result.push(Transfer::from(row));
        }

        Ok(result)
    }
}
