//! Badge evaluator.
//!
//! Speed badges are checked inline by the transfer-completion flow; weekly
//! ranking badges are recomputed on demand over a trailing window. Awards
//! are inserted with a conflict-ignoring insert against the unique
//! (user, badge, group) index, so concurrent evaluations of the same event
//! produce exactly one award. Checks whose badge is missing from the
//! catalog are skipped, never failed.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::OnConflict, prelude::*,
};
use uuid::Uuid;

use crate::{
    BADGE_BIGGEST_PAYMENT, BADGE_FAST_SETTLER, BADGE_FRUGAL, BADGE_SLOW_SETTLER,
    BADGE_SMALLEST_PAYMENT, BADGE_TOP_SPENDER, BadgeAward, BadgeDef, ResultEngine, WEEKLY_BADGES,
    badge_awards, badges, expense_shares, expenses, participants, transfers,
};

use super::{Engine, with_tx};

impl Engine {
    /// The full badge catalog.
    pub async fn list_badges(&self) -> ResultEngine<Vec<BadgeDef>> {
        with_tx!(self, |db_tx| {
            let rows = badges::Entity::find()
                .order_by_asc(badges::Column::ConditionCode)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(BadgeDef::from).collect())
        })
    }

    /// Awards held within a group, newest first.
    pub async fn list_awards(
        &self,
        group_id: Uuid,
        acting_user: &str,
    ) -> ResultEngine<Vec<BadgeAward>> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            let rows = badge_awards::Entity::find()
                .filter(badge_awards::Column::GroupId.eq(group_id))
                .order_by_desc(badge_awards::Column::AwardedAt)
                .find_also_related(badges::Entity)
                .all(&db_tx)
                .await?;
            Ok(rows
                .into_iter()
                .filter_map(|(award, badge)| {
                    badge.map(|badge| BadgeAward {
                        user_id: award.user_id,
                        condition_code: badge.condition_code,
                        group_id: award.group_id,
                        awarded_at: award.awarded_at,
                    })
                })
                .collect())
        })
    }

    /// Recomputes the weekly ranking badges for a group.
    ///
    /// All weekly awards of the group are cleared first, then the trailing
    /// window is scanned and the extrema re-awarded. Ties award every tied
    /// user; participants without a linked user never hold badges.
    pub async fn recompute_weekly_badges(
        &self,
        group_id: Uuid,
        acting_user: &str,
    ) -> ResultEngine<Vec<BadgeAward>> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, acting_user)
                .await?;
            self.clear_weekly_awards(&db_tx, group_id).await?;

            let now = Utc::now();
            let window_start = now - self.config.ranking_window;
            let rows = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id))
                .filter(expenses::Column::OccurredAt.gte(window_start))
                .find_with_related(expense_shares::Entity)
                .all(&db_tx)
                .await?;

            let user_of: HashMap<Uuid, Option<String>> = participants::Entity::find()
                .filter(participants::Column::GroupId.eq(group_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|p| (p.id, p.user_id))
                .collect();

            // (payer's user if linked, expense total) per window expense.
            let mut payments: Vec<(Option<String>, i64)> = Vec::with_capacity(rows.len());
            // Aggregate owed per linked user across the window.
            let mut owed_by_user: HashMap<String, i64> = HashMap::new();
            for (expense, shares) in &rows {
                let payer_user = user_of
                    .get(&expense.payer_participant_id)
                    .cloned()
                    .flatten();
                payments.push((payer_user, expense.amount_minor));
                for share in shares {
                    if let Some(Some(user)) = user_of.get(&share.participant_id) {
                        *owed_by_user.entry(user.clone()).or_insert(0) += share.owed_minor;
                    }
                }
            }

            let mut winners: HashSet<(&'static str, String)> = HashSet::new();

            // Extrema over all window payments, awarded only when positive:
            // a week containing a zero-total expense crowns no smallest payer.
            let biggest = payments.iter().map(|(_, a)| *a).max().filter(|a| *a > 0);
            let smallest = payments.iter().map(|(_, a)| *a).min().filter(|a| *a > 0);
            for (user, amount) in &payments {
                let Some(user) = user else { continue };
                if Some(*amount) == biggest {
                    winners.insert((BADGE_BIGGEST_PAYMENT, user.clone()));
                }
                if Some(*amount) == smallest {
                    winners.insert((BADGE_SMALLEST_PAYMENT, user.clone()));
                }
            }

            let top = owed_by_user.values().copied().filter(|v| *v > 0).max();
            let frugal = owed_by_user.values().copied().filter(|v| *v > 0).min();
            for (user, total) in &owed_by_user {
                if Some(*total) == top {
                    winners.insert((BADGE_TOP_SPENDER, user.clone()));
                }
                if Some(*total) == frugal {
                    winners.insert((BADGE_FRUGAL, user.clone()));
                }
            }

            let mut awards = Vec::with_capacity(winners.len());
            for (code, user) in winners {
                if let Some(award) = self
                    .award_if_absent(&db_tx, code, &user, group_id, now)
                    .await?
                {
                    awards.push(award);
                }
            }
            Ok(awards)
        })
    }

    /// Checks the completion delay of a transfer against the speed
    /// thresholds. The reference time is the last netting touch, falling
    /// back to row creation for rows that predate `debt_updated_at`.
    pub(super) async fn check_speed_badges(
        &self,
        db: &DatabaseTransaction,
        row: &transfers::Model,
        completed_at: DateTime<Utc>,
        debtor_user: &str,
    ) -> ResultEngine<()> {
        let reference = row.debt_updated_at.unwrap_or(row.created_at);
        let elapsed = completed_at - reference;
        if elapsed <= self.config.fast_settle_within {
            self.award_if_absent(db, BADGE_FAST_SETTLER, debtor_user, row.group_id, completed_at)
                .await?;
        }
        if elapsed > self.config.slow_settle_after {
            self.award_if_absent(db, BADGE_SLOW_SETTLER, debtor_user, row.group_id, completed_at)
                .await?;
        }
        Ok(())
    }

    async fn clear_weekly_awards(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<()> {
        let weekly_ids: Vec<Uuid> = badges::Entity::find()
            .filter(badges::Column::ConditionCode.is_in(WEEKLY_BADGES))
            .all(db)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();
        badge_awards::Entity::delete_many()
            .filter(badge_awards::Column::GroupId.eq(group_id))
            .filter(badge_awards::Column::BadgeId.is_in(weekly_ids))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Inserts an award unless the user already holds this badge in this
    /// group. Returns `None` when the badge is not in the catalog or the
    /// award already exists.
    async fn award_if_absent(
        &self,
        db: &DatabaseTransaction,
        condition_code: &str,
        user_id: &str,
        group_id: Uuid,
        awarded_at: DateTime<Utc>,
    ) -> ResultEngine<Option<BadgeAward>> {
        let Some(badge) = badges::Entity::find()
            .filter(badges::Column::ConditionCode.eq(condition_code))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let insert = badge_awards::Entity::insert(badge_awards::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id.to_string()),
            badge_id: ActiveValue::Set(badge.id),
            group_id: ActiveValue::Set(group_id),
            awarded_at: ActiveValue::Set(awarded_at),
        })
        .on_conflict(
            OnConflict::columns([
                badge_awards::Column::UserId,
                badge_awards::Column::BadgeId,
                badge_awards::Column::GroupId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(db)
        .await;

        match insert {
            Ok(_) => Ok(Some(BadgeAward {
                user_id: user_id.to_string(),
                condition_code: badge.condition_code,
                group_id,
                awarded_at,
            })),
            Err(DbErr::RecordNotInserted) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
