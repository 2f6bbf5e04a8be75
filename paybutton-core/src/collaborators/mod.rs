//! External collaborators of the payment controller.
//!
//! The controller never reaches for globals: the price feed, token metadata
//! lookup, unconfirmed-transaction lookup, the wallet provider locator, the
//! host environment and the outcome callbacks are all injected at mount time
//! through [`Collaborators`], so tests can substitute fakes for each.

mod explorer;

pub use explorer::{ExplorerProcessor, GetAddressUnconfirmed, GetPriceQuote, GetTokenInfo};

use async_trait::async_trait;
use paybutton_sdk::client::ClientError;
use paybutton_sdk::objects::{PriceQuote, TokenInfo, TransactionPayload, TxReceipt, UnconfirmedTransaction};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by the read-only collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// HTTP client failure
    #[error("collaborator request failed: {0}")]
    Client(#[from] ClientError),

    /// The collaborator has no data for the key
    #[error("not found: {0}")]
    NotFound(String),
}

/// The provider's callback reported an error instead of a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction rejected: {reason}")]
pub struct TransactionRejected {
    pub reason: String,
}

impl TransactionRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Current price of the native coin by fiat currency.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn price(&self, currency: &str) -> Result<PriceQuote, CollaboratorError>;
}

/// Token metadata keyed by token id.
#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
    async fn token_info(&self, token_id: &str) -> Result<TokenInfo, CollaboratorError>;
}

/// Unsettled transactions touching an address.
#[async_trait]
pub trait UnconfirmedSource: Send + Sync {
    async fn unconfirmed(&self, address: &str) -> Result<Vec<UnconfirmedTransaction>, CollaboratorError>;
}

/// An injected wallet provider.
///
/// The provider is owned by the host environment. Its default account may
/// appear, disappear or change between any two reads.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The currently authenticated account, if any.
    fn default_account(&self) -> Option<String>;

    /// Sign and broadcast a transaction. Resolves exactly once, with either
    /// the provider's result or its error. There is no timeout.
    async fn send_transaction(&self, payload: TransactionPayload) -> Result<TxReceipt, TransactionRejected>;
}

pub type ProviderHandle = Arc<dyn WalletProvider>;

/// Finds the wallet provider injected into the host environment.
pub trait ProviderLocator: Send + Sync {
    fn current_provider(&self) -> Option<ProviderHandle>;
}

/// Capabilities of the page hosting the widget.
pub trait HostEnvironment: Send + Sync {
    /// Open `url` in a new browsing context.
    fn open_url(&self, url: &str);
}

/// Caller-supplied outcome callbacks. Both default to no-ops.
pub trait PaymentCallbacks: Send + Sync {
    /// A payment succeeded. `receipt` is `None` when the payment was detected
    /// by the address watcher rather than reported by the provider.
    fn on_success(&self, _receipt: Option<&TxReceipt>) {}

    /// The provider rejected the transaction.
    fn on_failure(&self, _error: &TransactionRejected) {}
}

/// Callbacks that ignore every outcome.
pub struct NoCallbacks;

impl PaymentCallbacks for NoCallbacks {}

/// A locator for environments where no provider can ever be injected.
pub struct NoProvider;

impl ProviderLocator for NoProvider {
    fn current_provider(&self) -> Option<ProviderHandle> {
        None
    }
}

/// Every collaborator the controller needs, injected at mount time.
#[derive(Clone)]
pub struct Collaborators {
    pub price_feed: Arc<dyn PriceFeed>,
    pub token_metadata: Arc<dyn TokenMetadataSource>,
    pub unconfirmed: Arc<dyn UnconfirmedSource>,
    pub locator: Arc<dyn ProviderLocator>,
    pub host: Arc<dyn HostEnvironment>,
    pub callbacks: Arc<dyn PaymentCallbacks>,
}

impl Collaborators {
    /// Use one explorer processor for all three HTTP collaborators.
    pub fn from_explorer(
        explorer: ExplorerProcessor,
        locator: Arc<dyn ProviderLocator>,
        host: Arc<dyn HostEnvironment>,
    ) -> Self {
        let explorer = Arc::new(explorer);
        Self {
            price_feed: explorer.clone(),
            token_metadata: explorer.clone(),
            unconfirmed: explorer,
            locator,
            host,
            callbacks: Arc::new(NoCallbacks),
        }
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn PaymentCallbacks>) -> Self {
        self.callbacks = callbacks;
        self
    }
}
