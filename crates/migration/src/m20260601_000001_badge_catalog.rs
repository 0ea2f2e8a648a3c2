//! Seeds the badge catalog.
//!
//! The evaluator looks badges up by condition code and skips codes missing
//! from the catalog, so removing a row here disables that check without any
//! code change.

use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Badges {
    Table,
    Id,
    Name,
    Description,
    Kind,
    ConditionCode,
}

const CATALOG: [(&str, &str, &str, &str); 6] = [
    (
        "Fast settler",
        "Completed a transfer within minutes of being asked",
        "speed",
        "fast_settler",
    ),
    (
        "Slow settler",
        "Took more than two days to complete a transfer",
        "speed",
        "slow_settler",
    ),
    (
        "Biggest payment",
        "Paid the largest single expense of the week",
        "weekly",
        "biggest_payment",
    ),
    (
        "Smallest payment",
        "Paid the smallest single expense of the week",
        "weekly",
        "smallest_payment",
    ),
    (
        "Top spender",
        "Owed the most across the week",
        "weekly",
        "top_spender",
    ),
    (
        "Frugal",
        "Owed the least (but something) across the week",
        "weekly",
        "frugal",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, description, kind, condition_code) in CATALOG {
            let insert = Query::insert()
                .into_table(Badges::Table)
                .columns([
                    Badges::Id,
                    Badges::Name,
                    Badges::Description,
                    Badges::Kind,
                    Badges::ConditionCode,
                ])
                .values_panic([
                    Uuid::new_v4().into(),
                    name.into(),
                    description.into(),
                    kind.into(),
                    condition_code.into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let codes: Vec<&str> = CATALOG.iter().map(|(_, _, _, code)| *code).collect();
        let delete = Query::delete()
            .from_table(Badges::Table)
            .and_where(Expr::col(Badges::ConditionCode).is_in(codes))
            .to_owned();
        manager.exec_stmt(delete).await?;
        Ok(())
    }
}
