//! Checkout scenarios driven end to end against mocked backends.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use mockall::Sequence;
use reqwest::StatusCode;
use testresult::TestResult;
use tokio::time::Instant;
use uuid::Uuid;

use colophon::{
    api::{
        ApiError, Book, BookId, MockOrdersApi, MockPaymentsApi, Order, OrderId, OrderItemInput,
        OrderStatus, PaymentSession, PaymentSessionId, PaymentStatusReport,
    },
    cart::CartStore,
    checkout::{
        CheckoutError, CheckoutFailure, CheckoutOrchestrator, CheckoutPhase, PollPolicy,
        SettleOutcome,
    },
    session::UserId,
};

const ORIGIN: &str = "https://shop.example.com";

fn book(title: &str, price: f64) -> Book {
    Book {
        id: BookId::from_uuid(Uuid::new_v4()),
        title: title.to_owned(),
        author: "N. K. Jemisin".to_owned(),
        price,
        description: String::new(),
        cover_image_url: String::new(),
        stock_quantity: 10,
        category: "Fantasy".to_owned(),
        created_at: Timestamp::UNIX_EPOCH,
    }
}

fn placed_order(id: OrderId) -> Order {
    Order {
        id,
        user_id: UserId::new("7c0ad2f4-0001-4000-8000-000000000042"),
        items: Vec::new(),
        total_amount: 29.98,
        status: OrderStatus::Pending,
        stripe_session_id: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

fn hosted_session(order_id: OrderId) -> PaymentSession {
    PaymentSession {
        order_id,
        session_id: PaymentSessionId::new("cs_test_a1b2c3"),
        checkout_url: "https://pay.example.com/c/cs_test_a1b2c3".to_owned(),
    }
}

fn report(status: &str, payment_status: &str) -> PaymentStatusReport {
    PaymentStatusReport {
        status: status.to_owned(),
        payment_status: payment_status.to_owned(),
        amount_total: 29.98,
        currency: "usd".to_owned(),
    }
}

fn engine(
    orders: MockOrdersApi,
    payments: MockPaymentsApi,
    cart: Arc<CartStore>,
) -> CheckoutOrchestrator {
    CheckoutOrchestrator::new(
        Arc::new(orders),
        Arc::new(payments),
        cart,
        PollPolicy::default(),
    )
}

#[tokio::test]
async fn an_empty_cart_never_reaches_the_backend() {
    // No expectations: any backend call panics the mock.
    let orchestrator = engine(
        MockOrdersApi::new(),
        MockPaymentsApi::new(),
        Arc::new(CartStore::new()),
    );

    let result = orchestrator.begin_checkout(ORIGIN).await;

    assert!(
        matches!(result, Err(CheckoutError::EmptyCart)),
        "expected EmptyCart, got {result:?}"
    );
    assert_eq!(orchestrator.phase(), CheckoutPhase::Idle);
}

#[tokio::test]
async fn begin_checkout_submits_ids_and_quantities_only() -> TestResult {
    let first = book("The Fifth Season", 9.99);
    let second = book("The Obelisk Gate", 9.99);

    let cart = Arc::new(CartStore::new());
    cart.add(&first);
    cart.add(&second);
    cart.add(&second);

    let expected_items = vec![
        OrderItemInput {
            book_id: first.id,
            quantity: 1,
        },
        OrderItemInput {
            book_id: second.id,
            quantity: 2,
        },
    ];

    let order_id = OrderId::from_uuid(Uuid::new_v4());

    let mut orders = MockOrdersApi::new();
    orders
        .expect_create_order()
        .withf(move |items| *items == expected_items)
        .times(1)
        .returning(move |_| Ok(placed_order(order_id)));

    let mut payments = MockPaymentsApi::new();
    payments
        .expect_create_payment_session()
        .withf(move |id, origin| *id == order_id && origin == ORIGIN)
        .times(1)
        .returning(move |id, _| Ok(hosted_session(id)));

    let orchestrator = engine(orders, payments, Arc::clone(&cart));

    let session = orchestrator.begin_checkout(ORIGIN).await?;

    assert_eq!(session.order_id, order_id);
    assert_eq!(
        orchestrator.phase(),
        CheckoutPhase::AwaitingPayment {
            order_id,
            session_id: session.session_id,
        }
    );

    // The cart survives until the payment is confirmed.
    assert!(!cart.is_empty());
    assert_eq!(*orchestrator.refresh_signal().borrow(), 0);

    Ok(())
}

#[tokio::test]
async fn submit_failures_keep_the_servers_message() {
    let cart = Arc::new(CartStore::new());
    cart.add(&book("Dune", 9.99));

    let mut orders = MockOrdersApi::new();
    orders.expect_create_order().times(1).returning(|_| {
        Err(ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: Some("Insufficient stock for Dune".to_owned()),
        })
    });

    let orchestrator = engine(orders, MockPaymentsApi::new(), cart);

    let result = orchestrator.begin_checkout(ORIGIN).await;

    assert!(
        matches!(
            &result,
            Err(CheckoutError::Api(ApiError::Status { status, .. }))
                if *status == StatusCode::BAD_REQUEST
        ),
        "expected the status error through, got {result:?}"
    );
    assert_eq!(
        orchestrator.phase(),
        CheckoutPhase::Settled(SettleOutcome::Failure(CheckoutFailure::Submit(
            "Insufficient stock for Dune".to_owned(),
        )))
    );
}

#[tokio::test]
async fn payment_session_failures_settle_the_attempt() {
    let cart = Arc::new(CartStore::new());
    cart.add(&book("Dune", 9.99));

    let order_id = OrderId::from_uuid(Uuid::new_v4());

    let mut orders = MockOrdersApi::new();
    orders
        .expect_create_order()
        .times(1)
        .returning(move |_| Ok(placed_order(order_id)));

    let mut payments = MockPaymentsApi::new();
    payments
        .expect_create_payment_session()
        .times(1)
        .returning(|_, _| {
            Err(ApiError::Status {
                status: StatusCode::BAD_GATEWAY,
                detail: Some("payment provider unreachable".to_owned()),
            })
        });

    let orchestrator = engine(orders, payments, Arc::clone(&cart));

    let result = orchestrator.begin_checkout(ORIGIN).await;

    assert!(result.is_err(), "expected an error, got {result:?}");
    assert_eq!(
        orchestrator.phase(),
        CheckoutPhase::Settled(SettleOutcome::Failure(CheckoutFailure::PaymentSession(
            "payment provider unreachable".to_owned(),
        )))
    );

    // Submission failed, so the cart must still be intact.
    assert!(!cart.is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_payment_confirmed_on_the_fifth_attempt_succeeds() {
    let cart = Arc::new(CartStore::new());
    cart.add(&book("The Stone Sky", 9.99));

    let mut payments = MockPaymentsApi::new();
    let mut sequence = Sequence::new();
    payments
        .expect_payment_status()
        .times(4)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(report("open", "unpaid")));
    payments
        .expect_payment_status()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(report("complete", "paid")));

    let orchestrator = engine(MockOrdersApi::new(), payments, Arc::clone(&cart));

    let handle = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_a1b2c3"));
    let outcome = handle.settled().await;

    assert_eq!(outcome, Some(SettleOutcome::Success));
    assert!(cart.is_empty(), "a confirmed payment clears the cart");
    assert_eq!(*orchestrator.refresh_signal().borrow(), 1);
}

#[tokio::test(start_paused = true)]
async fn polling_times_out_after_five_attempts_without_a_sixth() {
    let mut payments = MockPaymentsApi::new();
    payments
        .expect_payment_status()
        .times(5)
        .returning(|_| Ok(report("open", "unpaid")));

    let orchestrator = engine(MockOrdersApi::new(), payments, Arc::new(CartStore::new()));

    let start = Instant::now();
    let handle = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_a1b2c3"));
    let outcome = handle.settled().await;

    assert_eq!(
        outcome,
        Some(SettleOutcome::Failure(CheckoutFailure::TimedOut))
    );

    // Four intervals between five requests, and no sleep after the last.
    assert_eq!(start.elapsed(), Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn an_expired_session_fails_immediately() {
    let mut payments = MockPaymentsApi::new();
    payments
        .expect_payment_status()
        .times(1)
        .returning(|_| Ok(report("expired", "unpaid")));

    let orchestrator = engine(MockOrdersApi::new(), payments, Arc::new(CartStore::new()));

    let handle = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_expired"));
    let outcome = handle.settled().await;

    assert_eq!(
        outcome,
        Some(SettleOutcome::Failure(CheckoutFailure::Expired))
    );
}

#[tokio::test(start_paused = true)]
async fn a_transport_failure_fails_verification_without_retry() {
    let cart = Arc::new(CartStore::new());
    cart.add(&book("Parable of the Sower", 11.50));

    let mut payments = MockPaymentsApi::new();
    payments.expect_payment_status().times(1).returning(|_| {
        Err(ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        })
    });

    let orchestrator = engine(MockOrdersApi::new(), payments, Arc::clone(&cart));

    let handle = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_a1b2c3"));
    let outcome = handle.settled().await;

    assert_eq!(
        outcome,
        Some(SettleOutcome::Failure(CheckoutFailure::Verification))
    );

    // An unverified payment never touches the cart.
    assert!(!cart.is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_new_attempt_silences_the_superseded_poller() {
    let cart = Arc::new(CartStore::new());
    cart.add(&book("Kindred", 10.99));

    let mut payments = MockPaymentsApi::new();
    payments
        .expect_payment_status()
        .withf(|session_id| session_id.as_str() == "cs_test_second")
        .times(1)
        .returning(|_| Ok(report("complete", "paid")));

    let orchestrator = engine(MockOrdersApi::new(), payments, Arc::clone(&cart));

    // The first poller is superseded before it ever runs; a call with its
    // session id would fail the mock.
    let first = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_first"));
    let second = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_second"));

    assert_eq!(first.settled().await, None);
    assert_eq!(second.settled().await, Some(SettleOutcome::Success));

    // Exactly one settle: one cart clear, one refresh.
    assert!(cart.is_empty());
    assert_eq!(*orchestrator.refresh_signal().borrow(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_polling_and_returns_to_idle() {
    let orchestrator = engine(
        MockOrdersApi::new(),
        MockPaymentsApi::new(),
        Arc::new(CartStore::new()),
    );

    let handle = orchestrator.reconcile_payment(PaymentSessionId::new("cs_test_a1b2c3"));

    assert_eq!(
        orchestrator.phase(),
        CheckoutPhase::Polling {
            session_id: PaymentSessionId::new("cs_test_a1b2c3"),
            attempt: 1,
        }
    );

    handle.cancel();

    assert_eq!(orchestrator.phase(), CheckoutPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn checkout_then_reconcile_clears_the_cart_once() -> TestResult {
    let novel = book("A Wizard of Earthsea", 8.99);
    let cart = Arc::new(CartStore::new());
    cart.add(&novel);

    let order_id = OrderId::from_uuid(Uuid::new_v4());

    let mut orders = MockOrdersApi::new();
    orders
        .expect_create_order()
        .times(1)
        .returning(move |_| Ok(placed_order(order_id)));

    let mut payments = MockPaymentsApi::new();
    payments
        .expect_create_payment_session()
        .times(1)
        .returning(move |id, _| Ok(hosted_session(id)));
    payments
        .expect_payment_status()
        .times(1)
        .returning(|_| Ok(report("complete", "paid")));

    let orchestrator = engine(orders, payments, Arc::clone(&cart));

    let session = orchestrator.begin_checkout(ORIGIN).await?;
    assert!(!cart.is_empty());

    let handle = orchestrator.reconcile_payment(session.session_id);
    let outcome = handle.settled().await;

    assert_eq!(outcome, Some(SettleOutcome::Success));
    assert!(cart.is_empty());
    assert_eq!(*orchestrator.refresh_signal().borrow(), 1);

    Ok(())
}
