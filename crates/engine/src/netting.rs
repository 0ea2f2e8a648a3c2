//! Debt-Netting Matcher: converts signed net balances into a small set of
//! pairwise transfers.
//!
//! Greedy two-pointer algorithm over debtors and creditors sorted by amount
//! descending. It emits at most `min(|debtors|, |creditors|) <= n - 1`
//! transfers for `n` participants with a nonzero balance; it is a greedy
//! approximation, not an exact minimum-transaction solver.

use std::collections::HashMap;

use uuid::Uuid;

use crate::MoneyMinor;

/// One planned pairwise payment, not yet persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub debtor_participant_id: Uuid,
    pub creditor_participant_id: Uuid,
    pub amount: MoneyMinor,
}

/// Runs the greedy matcher over a balance mapping.
///
/// Amounts at or below `epsilon_minor` are treated as settled: they never
/// become a transfer and exhaust their cursor. The sort is descending by
/// amount with participant id as the tie-break, so the plan is deterministic
/// for a given mapping.
pub fn plan_transfers(
    balances: &HashMap<Uuid, MoneyMinor>,
    epsilon_minor: i64,
) -> Vec<PlannedTransfer> {
    let epsilon = MoneyMinor::new(epsilon_minor);

    let mut debtors: Vec<(Uuid, MoneyMinor)> = balances
        .iter()
        .filter(|(_, balance)| balance.is_negative())
        .map(|(id, balance)| (*id, -*balance))
        .collect();
    let mut creditors: Vec<(Uuid, MoneyMinor)> = balances
        .iter()
        .filter(|(_, balance)| balance.is_positive())
        .map(|(id, balance)| (*id, *balance))
        .collect();

    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut plan = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let (debtor_id, debt) = debtors[i];
        let (creditor_id, credit) = creditors[j];

        let amount = debt.min(credit);
        if amount > epsilon {
            plan.push(PlannedTransfer {
                debtor_participant_id: debtor_id,
                creditor_participant_id: creditor_id,
                amount,
            });
        }

        debtors[i].1 = debt - amount;
        creditors[j].1 = credit - amount;

        if debtors[i].1 <= epsilon {
            i += 1;
        }
        if creditors[j].1 <= epsilon {
            j += 1;
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balances(entries: &[(Uuid, i64)]) -> HashMap<Uuid, MoneyMinor> {
        entries
            .iter()
            .map(|(id, minor)| (*id, MoneyMinor::new(*minor)))
            .collect()
    }

    #[test]
    fn empty_mapping_yields_empty_plan() {
        assert!(plan_transfers(&HashMap::new(), 1).is_empty());
    }

    #[test]
    fn one_creditor_absorbs_two_debtors() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let plan = plan_transfers(&balances(&[(a, 1500), (b, -1000), (c, -500)]), 1);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].debtor_participant_id, b);
        assert_eq!(plan[0].creditor_participant_id, a);
        assert_eq!(plan[0].amount.minor(), 1000);
        assert_eq!(plan[1].debtor_participant_id, c);
        assert_eq!(plan[1].amount.minor(), 500);
    }

    #[test]
    fn transfers_reconstruct_balances() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let input = balances(&[(ids[0], 2000), (ids[1], -1000), (ids[2], -700), (ids[3], -300)]);
        let plan = plan_transfers(&input, 1);

        let mut rebuilt: HashMap<Uuid, i64> = ids.iter().map(|id| (*id, 0)).collect();
        for transfer in &plan {
            *rebuilt.get_mut(&transfer.debtor_participant_id).unwrap() -=
                transfer.amount.minor();
            *rebuilt.get_mut(&transfer.creditor_participant_id).unwrap() +=
                transfer.amount.minor();
        }
        // In-transfers minus out-transfers reconstruct the original balance
        // within epsilon.
        for (id, balance) in &input {
            let delta = balance.minor() - rebuilt[id];
            assert!(delta.abs() <= 1, "participant {id} off by {delta}");
        }
    }

    #[test]
    fn never_more_than_n_minus_one_transfers() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let plan = plan_transfers(
            &balances(&[
                (ids[0], 4000),
                (ids[1], 1000),
                (ids[2], -2000),
                (ids[3], -2000),
                (ids[4], -1000),
            ]),
            1,
        );
        assert!(plan.len() <= 4);
        assert!(plan.iter().all(|t| t.amount.minor() > 1));
    }

    #[test]
    fn sub_epsilon_balances_are_dropped() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let plan = plan_transfers(&balances(&[(a, 1), (b, -1)]), 1);
        assert!(plan.is_empty());
    }
}
