use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        /// Placeholder participants created alongside the owner.
        #[serde(default)]
        pub members: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub invite_code: String,
        pub owner: String,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantNew {
        pub name: String,
        /// Username to link the participant to; absent for placeholders.
        pub user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub id: Uuid,
        pub name: String,
        pub user_id: Option<String>,
        pub is_admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantsResponse {
        pub participants: Vec<ParticipantView>,
    }

    /// Signed net position of one participant: positive is owed money,
    /// negative owes money.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub participant_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<BalanceView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitPolicy {
        Equal,
        ExplicitAmount,
        Ratio,
    }

    /// One participant's raw stake. Which field is read depends on the
    /// policy; `equal` ignores both.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub participant_id: Uuid,
        pub amount_minor: Option<i64>,
        /// Basis points, 10_000 = 100%.
        pub ratio_bp: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: Uuid,
        pub payer_participant_id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub split_policy: SplitPolicy,
        pub shares: Vec<ShareNew>,
        /// Economic event time; server uses now() when absent.
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    /// Partial update. `shares = Some(..)` replaces the allocation set
    /// wholesale; absent fields keep their stored value.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub title: Option<String>,
        pub amount_minor: Option<i64>,
        pub split_policy: Option<SplitPolicy>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub shares: Option<Vec<ShareNew>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub participant_id: Uuid,
        pub owed_minor: i64,
        pub paid: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub payer_participant_id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub split_policy: SplitPolicy,
        pub settled: bool,
        /// RFC3339 timestamp, including timezone offset.
        pub occurred_at: DateTime<FixedOffset>,
        pub created_by: String,
        pub shares: Vec<ShareView>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub debtor_participant_id: Uuid,
        pub creditor_participant_id: Uuid,
        pub amount_minor: i64,
        pub completed: bool,
        pub completed_at: Option<DateTime<FixedOffset>>,
        /// Last time a netting run touched this instruction.
        pub debt_updated_at: Option<DateTime<FixedOffset>>,
        /// Identifier shared by all instructions of one netting run.
        pub batch: String,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransfersResponse {
        pub transfers: Vec<TransferView>,
    }
}

pub mod badge {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BadgeView {
        pub name: String,
        pub description: Option<String>,
        pub kind: String,
        pub condition_code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BadgesResponse {
        pub badges: Vec<BadgeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AwardView {
        pub user_id: String,
        pub condition_code: String,
        pub group_id: Uuid,
        pub awarded_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AwardsResponse {
        pub awards: Vec<AwardView>,
    }
}
