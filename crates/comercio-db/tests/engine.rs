//! Integration tests for the ledger engine: the sale unit of work, the
//! FIFO receivable allocator, the direct payable allocator, and the
//! balance-aggregate invariant.
//!
//! Every test runs against its own in-memory SQLite database.

use comercio_core::error::CoreError;
use comercio_core::{
    EngineConfig, NewClient, NewPayable, NewProduct, NewSale, NewSaleLine, NewSupplier,
    ObligationStatus, OverpaymentPolicy, PayableKind, PaymentMethod,
};
use comercio_db::{Database, DbConfig, DbError};

// =============================================================================
// Helpers
// =============================================================================

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn test_db_with(engine: EngineConfig) -> Database {
    Database::new(DbConfig::in_memory().engine(engine))
        .await
        .unwrap()
}

async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> i64 {
    db.products()
        .insert(&NewProduct {
            code: None,
            name: name.to_string(),
            description: None,
            stock,
            cost_cents: price_cents / 2,
            price_cents,
            category: None,
        })
        .await
        .unwrap()
        .id
}

async fn seed_client(db: &Database, name: &str) -> i64 {
    db.clients()
        .insert(&NewClient {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            credit_limit_cents: 0,
            allow_credit: true,
            default_credit_days: 0,
        })
        .await
        .unwrap()
        .id
}

fn credit_sale(client_id: i64, lines: Vec<NewSaleLine>, total: i64, days: Option<u32>) -> NewSale {
    NewSale {
        client_id: Some(client_id),
        lines,
        total_cents: total,
        payment_method: PaymentMethod::Credit,
        credit_days: days,
    }
}

fn line(product_id: i64, qty: i64, price: i64) -> NewSaleLine {
    NewSaleLine {
        product_id,
        quantity: qty,
        unit_price_cents: price,
    }
}

/// The balance-aggregate invariant: debt == Σ pending receivable amounts.
async fn assert_debt_invariant(db: &Database, client_id: i64) {
    let debt = db.clients().debt(client_id).await.unwrap();
    let pending = db
        .clients()
        .pending_receivable_total(client_id)
        .await
        .unwrap();
    assert_eq!(
        debt, pending,
        "debt aggregate diverged from pending receivables for client {client_id}"
    );
}

// =============================================================================
// Sale Unit of Work
// =============================================================================

/// Scenario A: credit sale decrements stock, opens a receivable, raises debt.
#[tokio::test]
async fn credit_sale_opens_receivable_and_raises_debt() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Rice 1kg", 100, 10).await;
    let client_id = seed_client(&db, "Maria").await;

    let sale = db
        .sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 2, 100)],
            200,
            Some(30),
        ))
        .await
        .unwrap();

    assert_eq!(sale.credit_days, 30);
    assert_eq!(db.products().stock(product_id).await.unwrap(), 8);
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 200);

    let receivables = db.receivables().list_for_client(client_id).await.unwrap();
    assert_eq!(receivables.len(), 1);
    assert_eq!(receivables[0].amount_cents, 200);
    assert_eq!(receivables[0].initial_amount_cents, 200);
    assert_eq!(receivables[0].status, ObligationStatus::Pending);
    assert_eq!(receivables[0].sale_id, sale.id);
    assert_eq!(receivables[0].description, format!("Sale #{}", sale.id));

    let lines = db.sales().lines(sale.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].unit_price_cents, 100);

    assert_debt_invariant(&db, client_id).await;
}

#[tokio::test]
async fn cash_sale_never_touches_the_credit_ledger() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Cola", 250, 12).await;
    let client_id = seed_client(&db, "Jorge").await;

    db.sales()
        .create(&NewSale {
            client_id: Some(client_id),
            lines: vec![line(product_id, 3, 250)],
            total_cents: 750,
            payment_method: PaymentMethod::Cash,
            credit_days: None,
        })
        .await
        .unwrap();

    assert_eq!(db.products().stock(product_id).await.unwrap(), 9);
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 0);
    assert!(db
        .receivables()
        .list_for_client(client_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn insufficient_stock_rolls_back_the_whole_sale() {
    let db = test_db().await;
    let plentiful = seed_product(&db, "Water", 100, 50).await;
    let scarce = seed_product(&db, "Oil", 300, 1).await;
    let client_id = seed_client(&db, "Lucia").await;

    // First line would succeed; the second must drag it down with it.
    let err = db
        .sales()
        .create(&credit_sale(
            client_id,
            vec![line(plentiful, 5, 100), line(scarce, 3, 300)],
            1400,
            Some(15),
        ))
        .await
        .unwrap_err();

    match err {
        DbError::Core(CoreError::InsufficientStock {
            product_id,
            available,
            requested,
        }) => {
            assert_eq!(product_id, scarce);
            assert_eq!(available, 1);
            assert_eq!(requested, 3);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Nothing committed: no header, no lines, no stock movement, no debt.
    assert!(db.sales().list().await.unwrap().is_empty());
    assert_eq!(db.products().stock(plentiful).await.unwrap(), 50);
    assert_eq!(db.products().stock(scarce).await.unwrap(), 1);
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 0);
    assert!(db.receivables().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn credit_sale_without_client_is_rejected() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Sugar", 380, 10).await;

    let err = db
        .sales()
        .create(&NewSale {
            client_id: None,
            lines: vec![line(product_id, 1, 380)],
            total_cents: 380,
            payment_method: PaymentMethod::Credit,
            credit_days: Some(30),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Core(CoreError::CreditSaleRequiresClient)
    ));
    assert_eq!(db.products().stock(product_id).await.unwrap(), 10);
    assert!(db.sales().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn sale_total_must_match_line_sum() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Beans", 520, 10).await;
    let client_id = seed_client(&db, "Maria").await;

    let err = db
        .sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 2, 520)],
            999,
            Some(30),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    assert!(db.sales().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn credit_days_resolution_prefers_client_default() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Milk", 340, 10).await;

    let client = db
        .clients()
        .insert(&NewClient {
            name: "Ana".to_string(),
            email: None,
            phone: None,
            address: None,
            credit_limit_cents: 0,
            allow_credit: true,
            default_credit_days: 45,
        })
        .await
        .unwrap();

    // No explicit terms: the client's 45 days win over the engine's 30.
    let sale = db
        .sales()
        .create(&credit_sale(
            client.id,
            vec![line(product_id, 1, 340)],
            340,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(sale.credit_days, 45);

    // Explicit terms always win.
    let sale = db
        .sales()
        .create(&credit_sale(
            client.id,
            vec![line(product_id, 1, 340)],
            340,
            Some(7),
        ))
        .await
        .unwrap();
    assert_eq!(sale.credit_days, 7);
}

#[tokio::test]
async fn credit_refused_when_client_disallows_it() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Chips", 320, 10).await;

    let client = db
        .clients()
        .insert(&NewClient {
            name: "Lucia".to_string(),
            email: None,
            phone: None,
            address: None,
            credit_limit_cents: 0,
            allow_credit: false,
            default_credit_days: 0,
        })
        .await
        .unwrap();

    let err = db
        .sales()
        .create(&credit_sale(
            client.id,
            vec![line(product_id, 1, 320)],
            320,
            Some(30),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Core(CoreError::CreditNotAllowed { .. })));
    assert_eq!(db.products().stock(product_id).await.unwrap(), 10);
}

#[tokio::test]
async fn credit_refused_past_the_limit() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Detergent", 760, 20).await;

    let client = db
        .clients()
        .insert(&NewClient {
            name: "Jorge".to_string(),
            email: None,
            phone: None,
            address: None,
            credit_limit_cents: 1000,
            allow_credit: true,
            default_credit_days: 15,
        })
        .await
        .unwrap();

    // First sale fits the limit exactly.
    db.sales()
        .create(&credit_sale(
            client.id,
            vec![line(product_id, 1, 760)],
            760,
            None,
        ))
        .await
        .unwrap();

    // The next one would push debt to 1520 > 1000.
    let err = db
        .sales()
        .create(&credit_sale(
            client.id,
            vec![line(product_id, 1, 760)],
            760,
            None,
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Core(CoreError::CreditLimitExceeded { .. })
    ));
    assert_eq!(db.clients().debt(client.id).await.unwrap().cents(), 760);
    assert_debt_invariant(&db, client.id).await;
}

// =============================================================================
// Receivable FIFO Allocator
// =============================================================================

/// Scenario B: a partial payment reduces the oldest receivable and the debt.
#[tokio::test]
async fn partial_payment_reduces_receivable_and_debt() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Rice", 100, 10).await;
    let client_id = seed_client(&db, "Maria").await;

    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 2, 100)],
            200,
            Some(30),
        ))
        .await
        .unwrap();

    let outcome = db
        .receivables()
        .apply_client_payment(client_id, 150)
        .await
        .unwrap();

    assert_eq!(outcome.total_paid_cents, 150);
    assert_eq!(outcome.settled, 0);
    assert_eq!(outcome.touched, 1);

    let receivables = db.receivables().list_for_client(client_id).await.unwrap();
    assert_eq!(receivables[0].amount_cents, 50);
    assert_eq!(receivables[0].status, ObligationStatus::Pending);
    // The original amount stays frozen.
    assert_eq!(receivables[0].initial_amount_cents, 200);

    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 50);

    let history = db
        .receivables()
        .payment_history(receivables[0].id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount_cents, 150);

    assert_debt_invariant(&db, client_id).await;
}

/// The FIFO property: R1(100) then R2(50); paying 120 settles R1 and
/// leaves 30 on R2.
#[tokio::test]
async fn fifo_settles_oldest_receivable_first() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Water", 50, 100).await;
    let client_id = seed_client(&db, "Jorge").await;

    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 2, 50)],
            100,
            Some(30),
        ))
        .await
        .unwrap();
    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 1, 50)],
            50,
            Some(30),
        ))
        .await
        .unwrap();

    let outcome = db
        .receivables()
        .apply_client_payment(client_id, 120)
        .await
        .unwrap();

    assert_eq!(outcome.total_paid_cents, 120);
    assert_eq!(outcome.settled, 1);
    assert_eq!(outcome.touched, 2);

    let receivables = db.receivables().list_for_client(client_id).await.unwrap();
    assert_eq!(receivables.len(), 2);

    // list_for_client is oldest-first, mirroring allocation order.
    assert_eq!(receivables[0].amount_cents, 0);
    assert_eq!(receivables[0].status, ObligationStatus::Paid);
    assert_eq!(receivables[1].amount_cents, 30);
    assert_eq!(receivables[1].status, ObligationStatus::Pending);

    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 30);
    assert_debt_invariant(&db, client_id).await;
}

/// A settled receivable is immutable: further payments flow past it.
#[tokio::test]
async fn paid_receivables_are_skipped_by_later_payments() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Cola", 100, 100).await;
    let client_id = seed_client(&db, "Maria").await;

    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 1, 100)],
            100,
            Some(30),
        ))
        .await
        .unwrap();
    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 2, 100)],
            200,
            Some(30),
        ))
        .await
        .unwrap();

    db.receivables()
        .apply_client_payment(client_id, 100)
        .await
        .unwrap();
    let outcome = db
        .receivables()
        .apply_client_payment(client_id, 200)
        .await
        .unwrap();

    assert_eq!(outcome.total_paid_cents, 200);

    let receivables = db.receivables().list_for_client(client_id).await.unwrap();
    assert!(receivables
        .iter()
        .all(|r| r.status == ObligationStatus::Paid && r.amount_cents == 0));
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 0);

    // One audit row per allocation, never rewritten.
    let first_history = db
        .receivables()
        .payment_history(receivables[0].id)
        .await
        .unwrap();
    assert_eq!(first_history.len(), 1);
    assert_eq!(first_history[0].amount_cents, 100);

    assert_debt_invariant(&db, client_id).await;
}

#[tokio::test]
async fn overpayment_is_rejected_by_default() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Oil", 890, 10).await;
    let client_id = seed_client(&db, "Lucia").await;

    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 1, 890)],
            890,
            Some(30),
        ))
        .await
        .unwrap();

    let err = db
        .receivables()
        .apply_client_payment(client_id, 1000)
        .await
        .unwrap_err();

    match err {
        DbError::Core(CoreError::Overpayment {
            requested_cents,
            outstanding_cents,
        }) => {
            assert_eq!(requested_cents, 1000);
            assert_eq!(outstanding_cents, 890);
        }
        other => panic!("expected Overpayment, got {other:?}"),
    }

    // Nothing moved.
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 890);
    assert_debt_invariant(&db, client_id).await;
}

#[tokio::test]
async fn overpayment_absorbed_when_configured() {
    let db = test_db_with(
        EngineConfig::default().overpayment_policy(OverpaymentPolicy::Absorb),
    )
    .await;
    let product_id = seed_product(&db, "Oil", 890, 10).await;
    let client_id = seed_client(&db, "Lucia").await;

    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 1, 890)],
            890,
            Some(30),
        ))
        .await
        .unwrap();

    let outcome = db
        .receivables()
        .apply_client_payment(client_id, 1000)
        .await
        .unwrap();

    // Only the outstanding amount was allocated; the excess is visible to
    // the caller as the gap between requested and total_paid.
    assert_eq!(outcome.total_paid_cents, 890);
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 0);
    assert_debt_invariant(&db, client_id).await;
}

#[tokio::test]
async fn payment_with_nothing_pending_is_a_noop_under_absorb() {
    let db = test_db_with(
        EngineConfig::default().overpayment_policy(OverpaymentPolicy::Absorb),
    )
    .await;
    let client_id = seed_client(&db, "Maria").await;

    let outcome = db
        .receivables()
        .apply_client_payment(client_id, 500)
        .await
        .unwrap();

    assert_eq!(outcome.total_paid_cents, 0);
    assert_eq!(outcome.touched, 0);
    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 0);
}

#[tokio::test]
async fn payment_for_unknown_client_is_not_found() {
    let db = test_db().await;
    let err = db
        .receivables()
        .apply_client_payment(999, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn non_positive_payment_is_rejected() {
    let db = test_db().await;
    let client_id = seed_client(&db, "Maria").await;

    for amount in [0, -50] {
        let err = db
            .receivables()
            .apply_client_payment(client_id, amount)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }
}

// =============================================================================
// Payable Direct Allocator
// =============================================================================

async fn seed_payable(db: &Database, amount_cents: i64) -> i64 {
    let supplier = db
        .suppliers()
        .insert(&NewSupplier {
            name: "Distribuidora Central".to_string(),
            contact: None,
            email: None,
            phone: None,
        })
        .await
        .unwrap();

    db.payables()
        .create(&NewPayable {
            supplier_id: Some(supplier.id),
            payee: None,
            description: "Stock invoice".to_string(),
            amount_cents,
            kind: PayableKind::Invoice,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn payable_partial_payment_keeps_it_pending() {
    let db = test_db().await;
    let payable_id = seed_payable(&db, 10_000).await;

    let outcome = db
        .payables()
        .apply_payment(payable_id, 4_000)
        .await
        .unwrap();

    assert_eq!(outcome.status, ObligationStatus::Pending);
    assert_eq!(outcome.remaining_cents, 6_000);

    let payable = db.payables().get_by_id(payable_id).await.unwrap().unwrap();
    assert_eq!(payable.amount_cents, 6_000);
    assert_eq!(payable.initial_amount_cents, 10_000);

    let history = db.payables().payment_history(payable_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount_cents, 4_000);
}

/// Scenario C: a payment covering the remaining amount settles the payable.
/// Documented absorption behavior, policy-pending: under Absorb the excess
/// beyond the remaining amount is dropped.
#[tokio::test]
async fn payable_full_payment_settles_it() {
    let db = test_db_with(
        EngineConfig::default().overpayment_policy(OverpaymentPolicy::Absorb),
    )
    .await;
    let payable_id = seed_payable(&db, 5_000).await;

    let outcome = db
        .payables()
        .apply_payment(payable_id, 6_000)
        .await
        .unwrap();

    assert_eq!(outcome.status, ObligationStatus::Paid);
    assert_eq!(outcome.remaining_cents, 0);

    // The audit row records what was applied, not what was requested.
    let history = db.payables().payment_history(payable_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount_cents, 5_000);

    // Paid payables are immutable; another payment has nothing to target.
    let err = db
        .payables()
        .apply_payment(payable_id, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn payable_overpayment_rejected_by_default() {
    let db = test_db().await;
    let payable_id = seed_payable(&db, 5_000).await;

    let err = db
        .payables()
        .apply_payment(payable_id, 6_000)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Core(CoreError::Overpayment { .. })));

    let payable = db.payables().get_by_id(payable_id).await.unwrap().unwrap();
    assert_eq!(payable.amount_cents, 5_000);
    assert_eq!(payable.status, ObligationStatus::Pending);
    assert!(db
        .payables()
        .payment_history(payable_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn payable_payment_on_missing_row_is_not_found() {
    let db = test_db().await;
    let err = db.payables().apply_payment(42, 100).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

// =============================================================================
// Reads & Invariants
// =============================================================================

#[tokio::test]
async fn list_reads_are_idempotent() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Rice", 100, 10).await;
    let client_id = seed_client(&db, "Maria").await;

    db.sales()
        .create(&credit_sale(
            client_id,
            vec![line(product_id, 2, 100)],
            200,
            Some(30),
        ))
        .await
        .unwrap();
    seed_payable(&db, 3_000).await;

    let first = db.receivables().list().await.unwrap();
    let second = db.receivables().list().await.unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );

    let first = db.payables().list().await.unwrap();
    let second = db.payables().list().await.unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

/// Runs a mixed sequence of operations and re-checks the balance aggregate
/// after every commit.
#[tokio::test]
async fn debt_invariant_holds_across_mixed_operations() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Water", 80, 1000).await;
    let client_id = seed_client(&db, "Jorge").await;

    for qty in [1_i64, 3, 2] {
        db.sales()
            .create(&credit_sale(
                client_id,
                vec![line(product_id, qty, 80)],
                qty * 80,
                Some(30),
            ))
            .await
            .unwrap();
        assert_debt_invariant(&db, client_id).await;
    }

    // 80 + 240 + 160 = 480 outstanding across three receivables.
    for amount in [100_i64, 250, 130] {
        db.receivables()
            .apply_client_payment(client_id, amount)
            .await
            .unwrap();
        assert_debt_invariant(&db, client_id).await;
    }

    assert_eq!(db.clients().debt(client_id).await.unwrap().cents(), 0);
    let receivables = db.receivables().list_for_client(client_id).await.unwrap();
    assert!(receivables
        .iter()
        .all(|r| r.status == ObligationStatus::Paid));
}

#[tokio::test]
async fn stock_adjustment_cannot_go_negative() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Chips", 320, 5).await;

    db.products().adjust_stock(product_id, 10).await.unwrap();
    assert_eq!(db.products().stock(product_id).await.unwrap(), 15);

    let err = db
        .products()
        .adjust_stock(product_id, -20)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Core(CoreError::InsufficientStock { .. })
    ));
    assert_eq!(db.products().stock(product_id).await.unwrap(), 15);
}
