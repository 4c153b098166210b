//! App Context

use std::{path::PathBuf, sync::Arc};

use crate::{
    api::{OrdersApi, PaymentsApi, StorefrontClient, StorefrontConfig},
    cart::CartStore,
    checkout::{CheckoutOrchestrator, PollPolicy},
    portal::{PortalClient, PortalConfig},
    session::{SessionStatus, SessionStore, SessionStoreError},
};

/// Everything needed to stand the engine up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storefront: StorefrontConfig,
    pub portal: PortalConfig,

    /// Where the session survives restarts. `None` keeps it in memory.
    pub session_file: Option<PathBuf>,

    pub poll: PollPolicy,
}

/// Shared handles to every store and client in the engine.
///
/// Clones are cheap and all of them observe the same state, so the view
/// layer can hand a copy to each surface that needs one.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<SessionStore>,
    pub cart: Arc<CartStore>,
    pub storefront: Arc<StorefrontClient>,
    pub portal: Arc<PortalClient>,
    pub checkout: Arc<CheckoutOrchestrator>,
}

impl AppContext {
    /// Wire the stores and clients together. The storefront client backs
    /// the orchestrator's order and payment seams.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let session = Arc::new(match config.session_file {
            Some(path) => SessionStore::with_file(path),
            None => SessionStore::in_memory(),
        });

        let cart = Arc::new(CartStore::new());
        let storefront = Arc::new(StorefrontClient::new(
            config.storefront,
            Arc::clone(&session),
        ));
        let portal = Arc::new(PortalClient::new(config.portal));

        let checkout = Arc::new(CheckoutOrchestrator::new(
            Arc::clone(&storefront) as Arc<dyn OrdersApi>,
            Arc::clone(&storefront) as Arc<dyn PaymentsApi>,
            Arc::clone(&cart),
            config.poll,
        ));

        Self {
            session,
            cart,
            storefront,
            portal,
            checkout,
        }
    }

    /// Bring persisted state back before the first render. Until this
    /// runs the session reports [`SessionStatus::Loading`] and every
    /// authorization check stays pending.
    ///
    /// # Errors
    ///
    /// Returns an error when the session file exists but cannot be read;
    /// the session falls back to a guest in that case.
    pub fn restore(&self) -> Result<SessionStatus, SessionStoreError> {
        self.session.restore()
    }

    /// Drop everything user-scoped: the session, the cart, and any
    /// checkout attempt in flight.
    ///
    /// # Errors
    ///
    /// Returns an error when removing the session file fails; in-memory
    /// state is reset regardless.
    pub fn reset(&self) -> Result<(), SessionStoreError> {
        self.cart.clear();
        self.checkout.abandon();
        self.session.logout()
    }
}
