use crate::collaborators::{CollaboratorError, TransactionRejected};
use crate::config::PaymentRequestConfig;
use crate::conversion::ConversionError;
use paybutton_sdk::objects::{TokenInfo, TxReceipt};

/// Arming counter for a poller kind.
///
/// Every re-arm bumps the counter; events stamped with an older value come
/// from a poller that has since been replaced.
pub type Generation = u64;

/// Results reported by the controller's background tasks.
#[derive(Debug)]
pub enum ControllerEvent {
    /// A fiat price conversion finished.
    PriceComputed {
        generation: Generation,
        result: Result<u64, ConversionError>,
    },
    /// The trailing edge of the price debounce window was reached.
    PriceRefreshDue,
    /// A token metadata lookup finished.
    MetadataResolved {
        generation: Generation,
        token_id: String,
        result: Result<TokenInfo, CollaboratorError>,
    },
    /// The login poll saw an authenticated account.
    AccountDetected { account: String },
    /// The address watcher fetched the unconfirmed set.
    UnconfirmedObserved {
        generation: Generation,
        /// Set on the first fetch after arming; establishes the baseline.
        initial: bool,
        count: u32,
    },
    /// The watcher's fetch failed; the previous baseline stands.
    UnconfirmedUnavailable {
        generation: Generation,
        error: CollaboratorError,
    },
    /// The provider resolved a transaction submission.
    TransactionSettled {
        /// Which click this submission came from.
        submission: Generation,
        result: Result<TxReceipt, TransactionRejected>,
    },
    /// The repeat timeout after a completed payment elapsed.
    RepeatElapsed { generation: Generation },
}

impl ControllerEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::PriceComputed { .. } => "price-computed",
            ControllerEvent::PriceRefreshDue => "price-refresh-due",
            ControllerEvent::MetadataResolved { .. } => "metadata-resolved",
            ControllerEvent::AccountDetected { .. } => "account-detected",
            ControllerEvent::UnconfirmedObserved { .. } => "unconfirmed-observed",
            ControllerEvent::UnconfirmedUnavailable { .. } => "unconfirmed-unavailable",
            ControllerEvent::TransactionSettled { .. } => "transaction-settled",
            ControllerEvent::RepeatElapsed { .. } => "repeat-elapsed",
        }
    }
}

/// Requests from the controller's handle.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerCommand {
    /// The user clicked the button.
    Click,
    /// Replace the payment request.
    Reconfigure(Box<PaymentRequestConfig>),
}
