//! Settlement ledger and debt-netting engine.
//!
//! The engine converts shared expenses into per-participant owed amounts,
//! folds unsettled expenses into signed net balances, nets those balances
//! into a small set of pairwise transfer instructions, reconciles the plan
//! against outstanding instructions, and evaluates time- and ranking-based
//! badges off the same ledger data.
//!
//! All state lives in the database; every operation re-reads what it needs
//! inside one transaction. Netting and transfer completion for the same
//! group are serialized by a per-group async lock, while unrelated groups
//! proceed in parallel.

pub use badge_awards::BadgeAward;
pub use badges::{
    BADGE_BIGGEST_PAYMENT, BADGE_FAST_SETTLER, BADGE_FRUGAL, BADGE_SLOW_SETTLER,
    BADGE_SMALLEST_PAYMENT, BADGE_TOP_SPENDER, BadgeDef, WEEKLY_BADGES,
};
pub use config::EngineConfig;
pub use error::EngineError;
pub use expense_shares::Share;
pub use expenses::Expense;
pub use groups::Group;
pub use money::MoneyMinor;
pub use netting::{PlannedTransfer, plan_transfers};
pub use ops::{Engine, EngineBuilder, ExpensePatch};
pub use participants::Participant;
pub use split::{ShareInput, SplitPolicy, compute_shares};
pub use transfers::Transfer;

mod badge_awards;
mod badges;
mod config;
mod error;
mod expense_shares;
mod expenses;
mod groups;
mod money;
mod netting;
mod ops;
mod participants;
mod split;
mod transfers;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
