//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Splitpot:
//!
//! - `users`: authentication
//! - `groups`: shared-expense groups
//! - `participants`: group members, optionally linked to a user
//! - `expenses`: shared costs with a payer and a split policy
//! - `expense_shares`: per-participant owed amounts of one expense
//! - `transfers`: pairwise instructions produced by netting runs
//! - `badges`: badge catalog keyed by condition code
//! - `badge_awards`: badges held per (user, badge, group)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    Name,
    InviteCode,
    Owner,
    CreatedAt,
}

#[derive(Iden)]
enum Participants {
    Table,
    Id,
    GroupId,
    Name,
    NameNorm,
    UserId,
    IsAdmin,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    GroupId,
    PayerParticipantId,
    Title,
    AmountMinor,
    SplitPolicy,
    Settled,
    OccurredAt,
    CreatedBy,
}

#[derive(Iden)]
enum ExpenseShares {
    Table,
    Id,
    ExpenseId,
    ParticipantId,
    InputAmountMinor,
    InputRatioBp,
    OwedMinor,
    Paid,
    PaidAt,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    GroupId,
    DebtorParticipantId,
    CreditorParticipantId,
    AmountMinor,
    Completed,
    CompletedAt,
    DebtUpdatedAt,
    Batch,
    CreatedAt,
}

#[derive(Iden)]
enum Badges {
    Table,
    Id,
    Name,
    Description,
    Kind,
    ConditionCode,
}

#[derive(Iden)]
enum BadgeAwards {
    Table,
    Id,
    UserId,
    BadgeId,
    GroupId,
    AwardedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::InviteCode).string().not_null())
                    .col(ColumnDef::new(Groups::Owner).string().not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-groups-owner")
                            .from(Groups::Table, Groups::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-invite_code-unique")
                    .table(Groups::Table)
                    .col(Groups::InviteCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participants::GroupId).uuid().not_null())
                    .col(ColumnDef::new(Participants::Name).string().not_null())
                    .col(ColumnDef::new(Participants::NameNorm).string().not_null())
                    .col(ColumnDef::new(Participants::UserId).string())
                    .col(ColumnDef::new(Participants::IsAdmin).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-participants-group_id")
                            .from(Participants::Table, Participants::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-participants-user_id")
                            .from(Participants::Table, Participants::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-participants-group_id-name_norm-unique")
                    .table(Participants::Table)
                    .col(Participants::GroupId)
                    .col(Participants::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-participants-user_id")
                    .table(Participants::Table)
                    .col(Participants::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::GroupId).uuid().not_null())
                    .col(
                        ColumnDef::new(Expenses::PayerParticipantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Title).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::SplitPolicy).string().not_null())
                    .col(ColumnDef::new(Expenses::Settled).boolean().not_null())
                    .col(ColumnDef::new(Expenses::OccurredAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-group_id")
                            .from(Expenses::Table, Expenses::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-payer_participant_id")
                            .from(Expenses::Table, Expenses::PayerParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id-occurred_at")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .col(Expenses::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id-settled")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .col(Expenses::Settled)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expense shares
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseShares::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseShares::ExpenseId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExpenseShares::ParticipantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseShares::InputAmountMinor).big_integer())
                    .col(ColumnDef::new(ExpenseShares::InputRatioBp).big_integer())
                    .col(
                        ColumnDef::new(ExpenseShares::OwedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseShares::Paid).boolean().not_null())
                    .col(ColumnDef::new(ExpenseShares::PaidAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_shares-expense_id")
                            .from(ExpenseShares::Table, ExpenseShares::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_shares-participant_id")
                            .from(ExpenseShares::Table, ExpenseShares::ParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_shares-expense_id")
                    .table(ExpenseShares::Table)
                    .col(ExpenseShares::ExpenseId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transfers::GroupId).uuid().not_null())
                    .col(
                        ColumnDef::new(Transfers::DebtorParticipantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::CreditorParticipantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::Completed).boolean().not_null())
                    .col(ColumnDef::new(Transfers::CompletedAt).timestamp())
                    .col(ColumnDef::new(Transfers::DebtUpdatedAt).timestamp())
                    .col(ColumnDef::new(Transfers::Batch).string().not_null())
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-group_id")
                            .from(Transfers::Table, Transfers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-debtor_participant_id")
                            .from(Transfers::Table, Transfers::DebtorParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-creditor_participant_id")
                            .from(Transfers::Table, Transfers::CreditorParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-group_id-completed")
                    .table(Transfers::Table)
                    .col(Transfers::GroupId)
                    .col(Transfers::Completed)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-group_id-pair")
                    .table(Transfers::Table)
                    .col(Transfers::GroupId)
                    .col(Transfers::DebtorParticipantId)
                    .col(Transfers::CreditorParticipantId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Badges
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Badges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Badges::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Badges::Name).string().not_null())
                    .col(ColumnDef::new(Badges::Description).string())
                    .col(ColumnDef::new(Badges::Kind).string().not_null())
                    .col(ColumnDef::new(Badges::ConditionCode).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-badges-condition_code-unique")
                    .table(Badges::Table)
                    .col(Badges::ConditionCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Badge awards
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BadgeAwards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BadgeAwards::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BadgeAwards::UserId).string().not_null())
                    .col(ColumnDef::new(BadgeAwards::BadgeId).uuid().not_null())
                    .col(ColumnDef::new(BadgeAwards::GroupId).uuid().not_null())
                    .col(
                        ColumnDef::new(BadgeAwards::AwardedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-badge_awards-user_id")
                            .from(BadgeAwards::Table, BadgeAwards::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-badge_awards-badge_id")
                            .from(BadgeAwards::Table, BadgeAwards::BadgeId)
                            .to(Badges::Table, Badges::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-badge_awards-group_id")
                            .from(BadgeAwards::Table, BadgeAwards::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The award-if-absent insert relies on this unique triple.
        manager
            .create_index(
                Index::create()
                    .name("idx-badge_awards-user-badge-group-unique")
                    .table(BadgeAwards::Table)
                    .col(BadgeAwards::UserId)
                    .col(BadgeAwards::BadgeId)
                    .col(BadgeAwards::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(BadgeAwards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Badges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
