//! Checkout orchestrator.
//!
//! Drives a cart through order submission, hosted payment, and
//! confirmation polling. Exactly one attempt is live at a time: starting
//! a new attempt supersedes the previous one, and a superseded attempt's
//! polling task can neither touch the cart nor publish state, however far
//! it already got.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{Span, info, warn};

use crate::{
    api::{ApiError, OrdersApi, PaymentSession, PaymentSessionId, PaymentVerdict, PaymentsApi},
    cart::CartStore,
    checkout::{
        errors::CheckoutError,
        phase::{CheckoutFailure, CheckoutPhase, SettleOutcome},
    },
};

/// Polling cadence for payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive status requests.
    pub interval: Duration,

    /// Status requests per attempt before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// Five status checks, two seconds apart.
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 5,
        }
    }
}

struct AttemptState {
    generation: u64,
    poll_task: Option<JoinHandle<()>>,
}

struct Shared {
    orders: Arc<dyn OrdersApi>,
    payments: Arc<dyn PaymentsApi>,
    cart: Arc<CartStore>,
    policy: PollPolicy,
    phase: watch::Sender<CheckoutPhase>,
    refresh: watch::Sender<u64>,
    attempt: Mutex<AttemptState>,
}

impl Shared {
    fn lock_attempt(&self) -> MutexGuard<'_, AttemptState> {
        self.attempt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new attempt: bump the generation, abort any polling task
    /// left from the previous attempt, and publish the first phase.
    fn begin_attempt(&self, phase: CheckoutPhase) -> u64 {
        let mut state = self.lock_attempt();

        state.generation += 1;

        if let Some(task) = state.poll_task.take() {
            task.abort();
        }

        self.phase.send_replace(phase);

        state.generation
    }

    /// Publish a phase only while `generation` is still the live attempt.
    fn set_phase(&self, generation: u64, phase: CheckoutPhase) -> bool {
        let state = self.lock_attempt();

        if state.generation != generation {
            return false;
        }

        self.phase.send_replace(phase);

        true
    }

    /// Settle as paid: clear the cart, bump the refresh signal, publish
    /// success. All or nothing under the attempt lock, so a supersede
    /// can never interleave.
    fn settle_success(&self, generation: u64) -> bool {
        let state = self.lock_attempt();

        if state.generation != generation {
            return false;
        }

        self.cart.clear();
        self.refresh.send_modify(|count| *count += 1);
        self.phase
            .send_replace(CheckoutPhase::Settled(SettleOutcome::Success));

        true
    }

    fn settle_failure(&self, generation: u64, failure: CheckoutFailure) -> bool {
        self.set_phase(
            generation,
            CheckoutPhase::Settled(SettleOutcome::Failure(failure)),
        )
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_attempt().generation == generation
    }

    fn store_poll_task(&self, generation: u64, task: JoinHandle<()>) {
        let mut state = self.lock_attempt();

        if state.generation == generation {
            state.poll_task = Some(task);
        } else {
            // Superseded between spawn and registration.
            task.abort();
        }
    }
}

/// Drives checkout attempts against injected order and payment backends.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    shared: Arc<Shared>,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersApi>,
        payments: Arc<dyn PaymentsApi>,
        cart: Arc<CartStore>,
        policy: PollPolicy,
    ) -> Self {
        let (phase, _) = watch::channel(CheckoutPhase::Idle);
        let (refresh, _) = watch::channel(0);

        Self {
            shared: Arc::new(Shared {
                orders,
                payments,
                cart,
                policy,
                phase,
                refresh,
                attempt: Mutex::new(AttemptState {
                    generation: 0,
                    poll_task: None,
                }),
            }),
        }
    }

    /// Submit the cart as an order and open a hosted payment session.
    ///
    /// An empty cart is rejected before anything else happens: no request
    /// goes out and the phase does not move. Otherwise any previous
    /// attempt is superseded, the order is submitted with book ids and
    /// quantities only, and the returned session carries the URL to send
    /// the shopper to. The cart is left intact until the payment is
    /// confirmed.
    ///
    /// `origin` is the application's own origin, used by the backend to
    /// build the return URLs.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart is empty or when either backend
    /// call fails; backend failures also settle the attempt with the
    /// server's message kept verbatim.
    #[tracing::instrument(
        name = "checkout.begin",
        skip(self, origin),
        fields(order_id = tracing::field::Empty, session_id = tracing::field::Empty),
        err
    )]
    pub async fn begin_checkout(&self, origin: &str) -> Result<PaymentSession, CheckoutError> {
        let items = self.shared.cart.order_items();

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let generation = self.shared.begin_attempt(CheckoutPhase::Submitting);

        let order = match self.shared.orders.create_order(items).await {
            Ok(order) => order,
            Err(error) => {
                self.shared
                    .settle_failure(generation, CheckoutFailure::Submit(failure_message(&error)));
                return Err(error.into());
            }
        };

        Span::current().record("order_id", tracing::field::display(order.id));

        let session = match self
            .shared
            .payments
            .create_payment_session(order.id, origin.to_owned())
            .await
        {
            Ok(session) => session,
            Err(error) => {
                self.shared.settle_failure(
                    generation,
                    CheckoutFailure::PaymentSession(failure_message(&error)),
                );
                return Err(error.into());
            }
        };

        Span::current().record("session_id", tracing::field::display(&session.session_id));

        self.shared.set_phase(
            generation,
            CheckoutPhase::AwaitingPayment {
                order_id: order.id,
                session_id: session.session_id.clone(),
            },
        );

        info!(order_id = %order.id, session_id = %session.session_id, "checkout submitted");

        Ok(session)
    }

    /// Start confirmation polling for a session the shopper came back
    /// with, superseding any previous attempt.
    ///
    /// Polling runs on its own task: one status request per attempt, up
    /// to [`PollPolicy::max_attempts`], spaced by [`PollPolicy::interval`].
    /// A paid verdict clears the cart exactly once and raises the refresh
    /// signal; an expired session or a transport failure settles
    /// immediately; exhausting the budget settles as timed out without
    /// another request.
    #[tracing::instrument(name = "checkout.reconcile", skip(self, session_id), fields(session_id = %session_id))]
    pub fn reconcile_payment(&self, session_id: PaymentSessionId) -> ReconcileHandle {
        let generation = self.shared.begin_attempt(CheckoutPhase::Polling {
            session_id: session_id.clone(),
            attempt: 1,
        });

        let task = tokio::spawn(poll_until_settled(
            Arc::clone(&self.shared),
            generation,
            session_id,
        ));

        self.shared.store_poll_task(generation, task);

        ReconcileHandle {
            generation,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Abandon the current attempt, cancelling any polling in flight.
    /// The phase returns to `Idle`.
    pub fn abandon(&self) {
        self.shared.begin_attempt(CheckoutPhase::Idle);
    }

    /// The current phase, as a snapshot.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.shared.phase.borrow().clone()
    }

    /// Watch phase transitions as they happen.
    #[must_use]
    pub fn phase_updates(&self) -> watch::Receiver<CheckoutPhase> {
        self.shared.phase.subscribe()
    }

    /// Counter raised once per confirmed payment. The order list should
    /// be re-fetched whenever it changes; the orchestrator deliberately
    /// does not fetch it itself.
    #[must_use]
    pub fn refresh_signal(&self) -> watch::Receiver<u64> {
        self.shared.refresh.subscribe()
    }
}

/// Control over one spawned reconciliation task.
pub struct ReconcileHandle {
    generation: u64,
    shared: Arc<Shared>,
}

impl ReconcileHandle {
    /// Stop polling without settling; the phase returns to `Idle`. A
    /// no-op when this attempt has already been superseded.
    pub fn cancel(self) {
        let mut state = self.shared.lock_attempt();

        if state.generation != self.generation {
            return;
        }

        state.generation += 1;

        if let Some(task) = state.poll_task.take() {
            task.abort();
        }

        self.shared.phase.send_replace(CheckoutPhase::Idle);
    }

    /// Wait for this attempt to settle.
    ///
    /// Returns `None` when the attempt is cancelled or superseded before
    /// an outcome could be observed.
    pub async fn settled(&self) -> Option<SettleOutcome> {
        let mut updates = self.shared.phase.subscribe();

        loop {
            if !self.shared.is_current(self.generation) {
                return None;
            }

            {
                let phase = updates.borrow_and_update();

                if let CheckoutPhase::Settled(outcome) = &*phase {
                    return Some(outcome.clone());
                }
            }

            if updates.changed().await.is_err() {
                return None;
            }
        }
    }
}

#[tracing::instrument(
    name = "checkout.poll",
    skip(shared, session_id),
    fields(session_id = %session_id)
)]
async fn poll_until_settled(shared: Arc<Shared>, generation: u64, session_id: PaymentSessionId) {
    let PollPolicy {
        interval,
        max_attempts,
    } = shared.policy;

    for attempt in 1..=max_attempts {
        let live = shared.set_phase(
            generation,
            CheckoutPhase::Polling {
                session_id: session_id.clone(),
                attempt,
            },
        );

        if !live {
            return;
        }

        match shared.payments.payment_status(session_id.clone()).await {
            Ok(report) => match report.verdict() {
                PaymentVerdict::Paid => {
                    if shared.settle_success(generation) {
                        info!(attempt, "payment confirmed");
                    }
                    return;
                }
                PaymentVerdict::Expired => {
                    shared.settle_failure(generation, CheckoutFailure::Expired);
                    return;
                }
                PaymentVerdict::Pending => {}
            },
            // Fail fast: one broken status request ends the attempt.
            Err(error) => {
                warn!(attempt, error = %error, "payment status request failed");
                shared.settle_failure(generation, CheckoutFailure::Verification);
                return;
            }
        }

        if attempt == max_attempts {
            break;
        }

        time::sleep(interval).await;
    }

    shared.settle_failure(generation, CheckoutFailure::TimedOut);
}

/// The message an attempt settles with: the server's own words when it
/// sent any, the client-side error rendering otherwise.
fn failure_message(error: &ApiError) -> String {
    error
        .server_detail()
        .map_or_else(|| error.to_string(), str::to_owned)
}
