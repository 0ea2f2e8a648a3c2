use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    BADGE_BIGGEST_PAYMENT, BADGE_FAST_SETTLER, BADGE_FRUGAL, BADGE_SLOW_SETTLER,
    BADGE_SMALLEST_PAYMENT, BADGE_TOP_SPENDER, BadgeAward, Engine, MoneyMinor, ShareInput,
    SplitPolicy,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob", "carol"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

async fn trip_group(engine: &Engine) -> (Uuid, Uuid, Uuid, Uuid) {
    let group = engine.create_group("Trip", "alice", &[]).await.unwrap();
    engine
        .add_participant(group.id, "Bob", Some("bob"), "alice")
        .await
        .unwrap();
    engine
        .add_participant(group.id, "Carol", Some("carol"), "alice")
        .await
        .unwrap();
    let participants = engine.participants(group.id, "alice").await.unwrap();
    let by_user = |user: &str| {
        participants
            .iter()
            .find(|p| p.user_id.as_deref() == Some(user))
            .unwrap()
            .id
    };
    (group.id, by_user("alice"), by_user("bob"), by_user("carol"))
}

async fn equal_expense(engine: &Engine, group_id: Uuid, payer: Uuid, total: i64, members: &[Uuid]) {
    let inputs: Vec<_> = members.iter().copied().map(ShareInput::equal).collect();
    engine
        .create_expense(
            group_id,
            payer,
            "Dinner",
            MoneyMinor::new(total),
            SplitPolicy::Equal,
            &inputs,
            None,
            "alice",
        )
        .await
        .unwrap();
}

/// Rewinds a transfer's speed-badge reference timestamp by `hours` hours and
/// `minutes` minutes.
async fn backdate_transfer(db: &DatabaseConnection, transfer_id: Uuid, hours: i64, minutes: i64) {
    let reference = Utc::now() - Duration::hours(hours) - Duration::minutes(minutes);
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE transfers SET debt_updated_at = ? WHERE id = ?",
        vec![reference.into(), transfer_id.into()],
    ))
    .await
    .unwrap();
}

fn codes_of(awards: &[BadgeAward], user: &str) -> Vec<String> {
    let mut codes: Vec<String> = awards
        .iter()
        .filter(|a| a.user_id == user)
        .map(|a| a.condition_code.clone())
        .collect();
    codes.sort();
    codes
}

#[tokio::test]
async fn catalog_is_seeded() {
    let (engine, _db) = engine_with_db().await;
    let badges = engine.list_badges().await.unwrap();
    assert_eq!(badges.len(), 6);
    assert!(badges.iter().any(|b| b.condition_code == BADGE_FAST_SETTLER));
    assert!(badges.iter().any(|b| b.condition_code == BADGE_FRUGAL));
}

#[tokio::test]
async fn prompt_completion_awards_fast_settler() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;

    let transfers = engine.net_group(group_id, "alice").await.unwrap();
    let bob_transfer = transfers
        .iter()
        .find(|t| t.debtor_participant_id == bob)
        .unwrap();
    engine
        .complete_transfer(bob_transfer.id, "bob")
        .await
        .unwrap();

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert_eq!(codes_of(&awards, "bob"), vec![BADGE_FAST_SETTLER]);
}

#[tokio::test]
async fn four_minute_completion_is_fast_ten_is_neither() {
    let (engine, db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;

    let transfers = engine.net_group(group_id, "alice").await.unwrap();
    let bob_transfer = transfers
        .iter()
        .find(|t| t.debtor_participant_id == bob)
        .unwrap();
    let carol_transfer = transfers
        .iter()
        .find(|t| t.debtor_participant_id == carol)
        .unwrap();

    backdate_transfer(&db, bob_transfer.id, 0, 4).await;
    engine
        .complete_transfer(bob_transfer.id, "bob")
        .await
        .unwrap();

    backdate_transfer(&db, carol_transfer.id, 0, 10).await;
    engine
        .complete_transfer(carol_transfer.id, "carol")
        .await
        .unwrap();

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert_eq!(codes_of(&awards, "bob"), vec![BADGE_FAST_SETTLER]);
    assert!(codes_of(&awards, "carol").is_empty());
}

#[tokio::test]
async fn fifty_hour_completion_awards_slow_settler() {
    let (engine, db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;

    let transfers = engine.net_group(group_id, "alice").await.unwrap();
    let bob_transfer = transfers
        .iter()
        .find(|t| t.debtor_participant_id == bob)
        .unwrap();

    backdate_transfer(&db, bob_transfer.id, 50, 0).await;
    engine
        .complete_transfer(bob_transfer.id, "bob")
        .await
        .unwrap();

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert_eq!(codes_of(&awards, "bob"), vec![BADGE_SLOW_SETTLER]);
}

#[tokio::test]
async fn reference_falls_back_to_created_at() {
    let (engine, db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;

    let transfers = engine.net_group(group_id, "alice").await.unwrap();
    let bob_transfer = transfers
        .iter()
        .find(|t| t.debtor_participant_id == bob)
        .unwrap();

    // Rows from before the reconciler stamped debt_updated_at carry NULL
    // there; the check must fall back to created_at.
    let created = Utc::now() - Duration::hours(50);
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE transfers SET debt_updated_at = NULL, created_at = ? WHERE id = ?",
        vec![created.into(), bob_transfer.id.into()],
    ))
    .await
    .unwrap();

    engine
        .complete_transfer(bob_transfer.id, "bob")
        .await
        .unwrap();

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert_eq!(codes_of(&awards, "bob"), vec![BADGE_SLOW_SETTLER]);
}

#[tokio::test]
async fn placeholder_debtor_earns_no_speed_badge() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, ..) = trip_group(&engine).await;
    let dana = engine
        .add_participant(group_id, "Dana", None, "alice")
        .await
        .unwrap();

    equal_expense(&engine, group_id, alice, 2000, &[alice, dana.id]).await;
    let transfers = engine.net_group(group_id, "alice").await.unwrap();
    assert_eq!(transfers[0].debtor_participant_id, dana.id);

    // The creditor completes it; the unclaimed debtor cannot hold badges.
    engine
        .complete_transfer(transfers[0].id, "alice")
        .await
        .unwrap();

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert!(awards.is_empty());
}

#[tokio::test]
async fn repeated_fast_completions_award_once() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;

    for _ in 0..2 {
        equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;
        let transfers = engine.net_group(group_id, "alice").await.unwrap();
        let bob_transfer = transfers
            .iter()
            .find(|t| t.debtor_participant_id == bob && !t.completed)
            .unwrap();
        engine
            .complete_transfer(bob_transfer.id, "bob")
            .await
            .unwrap();
    }

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert_eq!(codes_of(&awards, "bob"), vec![BADGE_FAST_SETTLER]);
}

#[tokio::test]
async fn weekly_badges_rank_the_window() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;

    // alice pays the biggest single expense; bob the smallest. Owed totals:
    // alice 10.00, bob 11.00, carol 15.00.
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;
    engine
        .create_expense(
            group_id,
            bob,
            "Snacks",
            MoneyMinor::new(600),
            SplitPolicy::ExplicitAmount,
            &[
                ShareInput {
                    participant_id: bob,
                    amount_minor: Some(MoneyMinor::new(100)),
                    ratio_bp: None,
                },
                ShareInput {
                    participant_id: carol,
                    amount_minor: Some(MoneyMinor::new(500)),
                    ratio_bp: None,
                },
            ],
            None,
            "bob",
        )
        .await
        .unwrap();

    let awards = engine
        .recompute_weekly_badges(group_id, "alice")
        .await
        .unwrap();

    assert_eq!(codes_of(&awards, "alice"), vec![BADGE_BIGGEST_PAYMENT, BADGE_FRUGAL]);
    assert_eq!(codes_of(&awards, "bob"), vec![BADGE_SMALLEST_PAYMENT]);
    assert_eq!(codes_of(&awards, "carol"), vec![BADGE_TOP_SPENDER]);
}

#[tokio::test]
async fn zero_total_expense_blocks_smallest_payment() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;

    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;
    // A 0.00 expense makes the week's minimum non-positive; nobody is
    // crowned smallest payer.
    equal_expense(&engine, group_id, bob, 0, &[bob, carol]).await;

    let awards = engine
        .recompute_weekly_badges(group_id, "alice")
        .await
        .unwrap();

    assert!(
        awards
            .iter()
            .all(|a| a.condition_code != BADGE_SMALLEST_PAYMENT)
    );
    assert!(codes_of(&awards, "alice").contains(&BADGE_BIGGEST_PAYMENT.to_string()));
}

#[tokio::test]
async fn weekly_recomputation_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;

    let first = engine
        .recompute_weekly_badges(group_id, "alice")
        .await
        .unwrap();
    let second = engine
        .recompute_weekly_badges(group_id, "alice")
        .await
        .unwrap();
    assert_eq!(first.len(), second.len());

    let held = engine.list_awards(group_id, "alice").await.unwrap();
    assert_eq!(held.len(), second.len());
}

#[tokio::test]
async fn weekly_ties_award_every_tied_user() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;

    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;
    equal_expense(&engine, group_id, bob, 3000, &[alice, bob, carol]).await;

    let awards = engine
        .recompute_weekly_badges(group_id, "alice")
        .await
        .unwrap();

    let biggest: Vec<&str> = awards
        .iter()
        .filter(|a| a.condition_code == BADGE_BIGGEST_PAYMENT)
        .map(|a| a.user_id.as_str())
        .collect();
    assert_eq!(biggest.len(), 2);
    assert!(biggest.contains(&"alice") && biggest.contains(&"bob"));
}

#[tokio::test]
async fn weekly_recompute_keeps_speed_badges() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, alice, bob, carol) = trip_group(&engine).await;
    equal_expense(&engine, group_id, alice, 3000, &[alice, bob, carol]).await;

    let transfers = engine.net_group(group_id, "alice").await.unwrap();
    let bob_transfer = transfers
        .iter()
        .find(|t| t.debtor_participant_id == bob)
        .unwrap();
    engine
        .complete_transfer(bob_transfer.id, "bob")
        .await
        .unwrap();

    engine
        .recompute_weekly_badges(group_id, "alice")
        .await
        .unwrap();

    let awards = engine.list_awards(group_id, "alice").await.unwrap();
    assert!(codes_of(&awards, "bob").contains(&BADGE_FAST_SETTLER.to_string()));
}
