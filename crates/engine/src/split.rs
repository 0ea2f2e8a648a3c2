//! Share Calculator: turns one expense total plus a split policy into one
//! owed amount per participant.
//!
//! The calculator is a pure function; the expense ops feed it validated
//! participant lists and persist its output as share rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyMinor, ResultEngine};

/// Rule for deriving each participant's owed share of an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// `owed_i = total / n`, truncating division, drift not redistributed.
    Equal,
    /// `owed_i = input amount` (0 when absent). The sum is a caller
    /// contract, not validated here.
    ExplicitAmount,
    /// `owed_i = total * ratio_bp / 10_000` (0 when absent). Sum not
    /// validated either.
    Ratio,
}

impl SplitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::ExplicitAmount => "explicit_amount",
            Self::Ratio => "ratio",
        }
    }
}

impl TryFrom<&str> for SplitPolicy {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "explicit_amount" => Ok(Self::ExplicitAmount),
            "ratio" => Ok(Self::Ratio),
            other => Err(EngineError::InvalidSplit(format!(
                "invalid split policy: {other}"
            ))),
        }
    }
}

/// One participant's raw stake in an expense, as supplied by the caller.
///
/// Which field is read depends on the policy; the other is kept as-is so an
/// update can re-derive shares later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareInput {
    pub participant_id: Uuid,
    pub amount_minor: Option<MoneyMinor>,
    pub ratio_bp: Option<i64>,
}

impl ShareInput {
    pub fn equal(participant_id: Uuid) -> Self {
        Self {
            participant_id,
            amount_minor: None,
            ratio_bp: None,
        }
    }
}

/// Computes the owed amount for every participant of an expense.
///
/// Errors when the input list is empty or the payer is not among the
/// participants. Ratio/explicit sums are not checked against the total.
pub fn compute_shares(
    total: MoneyMinor,
    policy: SplitPolicy,
    payer_participant_id: Uuid,
    inputs: &[ShareInput],
) -> ResultEngine<Vec<(ShareInput, MoneyMinor)>> {
    if inputs.is_empty() {
        return Err(EngineError::InvalidSplit(
            "at least one participant is required".to_string(),
        ));
    }
    if total.is_negative() {
        return Err(EngineError::InvalidAmount(
            "total amount must be >= 0".to_string(),
        ));
    }
    if !inputs
        .iter()
        .any(|input| input.participant_id == payer_participant_id)
    {
        return Err(EngineError::InvalidSplit(
            "payer must be included in participants".to_string(),
        ));
    }

    let n = inputs.len() as u32;
    let shares = inputs
        .iter()
        .map(|input| {
            let owed = match policy {
                SplitPolicy::Equal => total.split_equal(n),
                SplitPolicy::ExplicitAmount => input.amount_minor.unwrap_or(MoneyMinor::ZERO),
                SplitPolicy::Ratio => total.apply_ratio_bp(input.ratio_bp.unwrap_or(0)),
            };
            (*input, owed)
        })
        .collect();

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn equal_split_divides_total() {
        let ids = ids(3);
        let inputs: Vec<_> = ids.iter().copied().map(ShareInput::equal).collect();
        let shares =
            compute_shares(MoneyMinor::new(3000), SplitPolicy::Equal, ids[0], &inputs).unwrap();
        assert!(shares.iter().all(|(_, owed)| owed.minor() == 1000));
    }

    #[test]
    fn equal_split_drift_is_bounded() {
        let ids = ids(3);
        let inputs: Vec<_> = ids.iter().copied().map(ShareInput::equal).collect();
        let total = MoneyMinor::new(1000);
        let shares = compute_shares(total, SplitPolicy::Equal, ids[0], &inputs).unwrap();
        let sum: i64 = shares.iter().map(|(_, owed)| owed.minor()).sum();
        assert!(total.minor() - sum < inputs.len() as i64);
        assert!(sum <= total.minor());
    }

    #[test]
    fn explicit_amounts_are_taken_verbatim() {
        let ids = ids(2);
        let inputs = vec![
            ShareInput {
                participant_id: ids[0],
                amount_minor: Some(MoneyMinor::new(700)),
                ratio_bp: None,
            },
            ShareInput {
                participant_id: ids[1],
                amount_minor: None,
                ratio_bp: None,
            },
        ];
        // Sum (7.00) does not match the total (10.00); the calculator does
        // not check it.
        let shares = compute_shares(
            MoneyMinor::new(1000),
            SplitPolicy::ExplicitAmount,
            ids[0],
            &inputs,
        )
        .unwrap();
        assert_eq!(shares[0].1.minor(), 700);
        assert_eq!(shares[1].1.minor(), 0);
    }

    #[test]
    fn ratio_split_uses_basis_points() {
        let ids = ids(2);
        let inputs = vec![
            ShareInput {
                participant_id: ids[0],
                amount_minor: None,
                ratio_bp: Some(7500),
            },
            ShareInput {
                participant_id: ids[1],
                amount_minor: None,
                ratio_bp: Some(2500),
            },
        ];
        let shares =
            compute_shares(MoneyMinor::new(2000), SplitPolicy::Ratio, ids[0], &inputs).unwrap();
        assert_eq!(shares[0].1.minor(), 1500);
        assert_eq!(shares[1].1.minor(), 500);
    }

    #[test]
    fn empty_participants_are_rejected() {
        let payer = Uuid::new_v4();
        let err = compute_shares(MoneyMinor::new(1000), SplitPolicy::Equal, payer, &[])
            .expect_err("empty input must fail");
        assert_eq!(
            err,
            EngineError::InvalidSplit("at least one participant is required".to_string())
        );
    }

    #[test]
    fn payer_must_be_a_participant() {
        let ids = ids(2);
        let inputs = vec![ShareInput::equal(ids[0])];
        let err = compute_shares(MoneyMinor::new(1000), SplitPolicy::Equal, ids[1], &inputs)
            .expect_err("payer outside the list must fail");
        assert_eq!(
            err,
            EngineError::InvalidSplit("payer must be included in participants".to_string())
        );
    }
}
