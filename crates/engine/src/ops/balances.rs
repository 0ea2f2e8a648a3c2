//! Balance Aggregator.
//!
//! Net balances are derived, in-memory-only data: every call folds the
//! current unsettled ledger from scratch, nothing is cached.

use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{MoneyMinor, ResultEngine, expense_shares, expenses};

use super::{Engine, with_tx};

impl Engine {
    /// Returns the signed net balance per participant for a group.
    ///
    /// Positive = is owed money (creditor); negative = owes money (debtor).
    /// The payer of each unsettled expense is credited the full total and
    /// debited their own share like any other recipient.
    pub async fn group_balances(
        &self,
        group_id: Uuid,
        acting_user: &str,
    ) -> ResultEngine<HashMap<Uuid, MoneyMinor>> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            self.fold_balances(&db_tx, group_id).await
        })
    }

    pub(super) async fn fold_balances(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<HashMap<Uuid, MoneyMinor>> {
        let rows: Vec<(expenses::Model, Vec<expense_shares::Model>)> = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id))
            .filter(expenses::Column::Settled.eq(false))
            .find_with_related(expense_shares::Entity)
            .all(db)
            .await?;

        let mut balances: HashMap<Uuid, MoneyMinor> = HashMap::new();
        for (expense, shares) in rows {
            *balances
                .entry(expense.payer_participant_id)
                .or_insert(MoneyMinor::ZERO) += MoneyMinor::new(expense.amount_minor);
            for share in shares {
                *balances
                    .entry(share.participant_id)
                    .or_insert(MoneyMinor::ZERO) -= MoneyMinor::new(share.owed_minor);
            }
        }

        Ok(balances)
    }
}
