use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use ledger::{ExpenseKind, Ledger, User};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

async fn user(ledger: &Ledger, name: &str) -> User {
    ledger
        .create_user(name, &format!("{name}@example.com"), None)
        .await
        .unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn balances_split_evenly_and_sum_to_zero() {
    let (ledger, _db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let bob = user(&ledger, "bob").await;
    let carol = user(&ledger, "carol").await;
    let group = ledger.create_group("Trip", None, &alice).await.unwrap();
    ledger.add_member(&group.id, &bob).await.unwrap();
    ledger.add_member(&group.id, &carol).await.unwrap();

    let everyone = vec![alice.id.clone(), bob.id.clone(), carol.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Dinner",
            90.0,
            &alice.id,
            &everyone,
            ExpenseKind::Expense,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
    let pair = vec![bob.id.clone(), carol.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Taxi",
            40.0,
            &bob.id,
            &pair,
            ExpenseKind::Expense,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let balances = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(balances[&alice.id], 60.0);
    assert_close(balances[&bob.id], -10.0);
    assert_close(balances[&carol.id], -50.0);
    assert_close(balances.values().sum::<f64>(), 0.0);
}

#[tokio::test]
async fn settlement_cancels_debt() {
    let (ledger, _db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let bob = user(&ledger, "bob").await;
    let group = ledger.create_group("Flat", None, &alice).await.unwrap();
    ledger.add_member(&group.id, &bob).await.unwrap();

    let both = vec![alice.id.clone(), bob.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Groceries",
            100.0,
            &alice.id,
            &both,
            ExpenseKind::Expense,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let balances = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(balances[&alice.id], 50.0);
    assert_close(balances[&bob.id], -50.0);

    // Bob pays Alice back; the settlement is a payer-to-recipient transfer.
    let to_alice = vec![alice.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Payback",
            50.0,
            &bob.id,
            &to_alice,
            ExpenseKind::Settlement,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let balances = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(balances[&alice.id], 0.0);
    assert_close(balances[&bob.id], 0.0);
}

#[tokio::test]
async fn members_without_history_and_removed_members_both_appear() {
    let (ledger, _db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let bob = user(&ledger, "bob").await;
    let carol = user(&ledger, "carol").await;
    let group = ledger.create_group("Trip", None, &alice).await.unwrap();
    ledger.add_member(&group.id, &bob).await.unwrap();
    ledger.add_member(&group.id, &carol).await.unwrap();

    let pair = vec![alice.id.clone(), bob.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Dinner",
            80.0,
            &alice.id,
            &pair,
            ExpenseKind::Expense,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    // Carol never transacted; she still shows up at zero.
    let balances = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(balances[&carol.id], 0.0);

    // Bob leaves, but his surviving debt keeps him in the result.
    ledger.remove_member(&group.id, &bob.id).await.unwrap();
    let balances = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(balances[&bob.id], -40.0);
    assert_close(balances[&alice.id], 40.0);
    assert_close(balances.values().sum::<f64>(), 0.0);
}

#[tokio::test]
async fn expenses_with_no_split_rows_contribute_nothing() {
    let (ledger, db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let group = ledger.create_group("Trip", None, &alice).await.unwrap();

    // A row with no split members cannot be created through the API; plant
    // one directly the way damaged upstream data could.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO expenses (id, group_id, title, amount, paid_by, kind, occurred_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?);",
        vec![
            "splitless".into(),
            group.id.clone().into(),
            "Broken".into(),
            100.0f64.into(),
            alice.id.clone().into(),
            "expense".into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();

    let balances = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(balances[&alice.id], 0.0);
}

#[tokio::test]
async fn recompute_group_total_repairs_corruption_and_skips_settlements() {
    let (ledger, db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let bob = user(&ledger, "bob").await;
    let group = ledger.create_group("Trip", None, &alice).await.unwrap();
    ledger.add_member(&group.id, &bob).await.unwrap();

    let both = vec![alice.id.clone(), bob.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Dinner",
            100.0,
            &alice.id,
            &both,
            ExpenseKind::Expense,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
    let to_alice = vec![alice.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Payback",
            50.0,
            &bob.id,
            &to_alice,
            ExpenseKind::Settlement,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE groups SET total_expenses = ? WHERE id = ?;",
        vec![999.0f64.into(), group.id.clone().into()],
    ))
    .await
    .unwrap();

    let total = ledger.recompute_group_total(&group.id).await.unwrap();
    assert_close(total, 100.0);

    let group_state = ledger.group(&group.id).await.unwrap();
    assert_close(group_state.total_expenses, 100.0);
}

#[tokio::test]
async fn recompute_members_paid_rebuilds_from_surviving_expenses() {
    let (ledger, _db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let bob = user(&ledger, "bob").await;
    let group = ledger.create_group("Trip", None, &alice).await.unwrap();
    ledger.add_member(&group.id, &bob).await.unwrap();
    let request = ledger
        .create_request(&group.id, "Hotel", None, &alice.id, &[bob.id.clone()])
        .await
        .unwrap();

    let both = vec![alice.id.clone(), bob.id.clone()];
    let from_bob = ledger
        .add_expense(
            &group.id,
            "Deposit",
            60.0,
            &bob.id,
            &both,
            ExpenseKind::Expense,
            Some(&request.id),
            Utc::now(),
        )
        .await
        .unwrap();
    ledger
        .add_expense(
            &group.id,
            "Room",
            100.0,
            &alice.id,
            &both,
            ExpenseKind::Expense,
            Some(&request.id),
            Utc::now(),
        )
        .await
        .unwrap();

    // The live roster is sticky: deleting Bob's expense keeps him marked.
    ledger.delete_expense(&from_bob.id).await.unwrap();
    let state = ledger.request(&request.id).await.unwrap();
    assert!(state.members_paid.contains(&bob.id));

    // The repair pass rebuilds from what actually survives.
    let payers = ledger.recompute_members_paid(&request.id).await.unwrap();
    assert_eq!(payers, vec![alice.id.clone()]);
    let state = ledger.request(&request.id).await.unwrap();
    assert_eq!(state.members_paid, vec![alice.id]);
}

#[tokio::test]
async fn request_scope_narrows_the_walked_expenses() {
    let (ledger, _db) = ledger_with_db().await;
    let alice = user(&ledger, "alice").await;
    let bob = user(&ledger, "bob").await;
    let group = ledger.create_group("Trip", None, &alice).await.unwrap();
    ledger.add_member(&group.id, &bob).await.unwrap();
    let request = ledger
        .create_request(&group.id, "Hotel", None, &alice.id, &[bob.id.clone()])
        .await
        .unwrap();

    let both = vec![alice.id.clone(), bob.id.clone()];
    ledger
        .add_expense(
            &group.id,
            "Room",
            100.0,
            &alice.id,
            &both,
            ExpenseKind::Expense,
            Some(&request.id),
            Utc::now(),
        )
        .await
        .unwrap();
    ledger
        .add_expense(
            &group.id,
            "Taxi",
            40.0,
            &bob.id,
            &both,
            ExpenseKind::Expense,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let scoped = ledger
        .group_balances(&group.id, Some(&request.id))
        .await
        .unwrap();
    assert_close(scoped[&alice.id], 50.0);
    assert_close(scoped[&bob.id], -50.0);

    // The group-wide view is a superset of the scoped one.
    let all = ledger.group_balances(&group.id, None).await.unwrap();
    assert_close(all[&alice.id], 30.0);
    assert_close(all[&bob.id], -30.0);
}
