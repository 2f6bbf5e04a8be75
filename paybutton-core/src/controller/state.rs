use crate::config::PaymentRequestConfig;
use crate::processors::{Observation, classify_unconfirmed};
use paybutton_sdk::objects::CoinMeta;
use serde::{Deserialize, Serialize};

/// The step the payment button is displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    /// Clickable, waiting for the user.
    #[default]
    Fresh,
    /// A transaction was handed to the provider.
    Pending,
    /// The payment went through.
    Complete,
    /// A provider is present but nobody is logged in.
    #[serde(rename = "login")]
    LoginRequired,
    /// No provider is present.
    #[serde(rename = "install")]
    InstallRequired,
}

impl std::fmt::Display for ButtonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ButtonState::Fresh => "fresh",
            ButtonState::Pending => "pending",
            ButtonState::Complete => "complete",
            ButtonState::LoginRequired => "login",
            ButtonState::InstallRequired => "install",
        };
        f.write_str(name)
    }
}

impl ButtonState {
    /// Whether a click starts the payment path from this step.
    pub fn accepts_click(self) -> bool {
        matches!(
            self,
            ButtonState::Fresh | ButtonState::LoginRequired | ButtonState::InstallRequired
        )
    }
}

/// Who reported a completed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The provider resolved the submitted transaction.
    Provider,
    /// The address watcher saw the unconfirmed set grow.
    Watcher,
}

/// State owned by one mounted controller.
///
/// Fields are only changed through the transition methods below, each of
/// which returns whether it applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    step: ButtonState,
    satoshis: Option<u64>,
    coin_meta: CoinMeta,
    unconfirmed_count: Option<u32>,
    errors: Vec<String>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> ButtonState {
        self.step
    }

    /// Satoshis computed from the fiat price.
    pub fn satoshis(&self) -> Option<u64> {
        self.satoshis
    }

    pub fn coin_meta(&self) -> &CoinMeta {
        &self.coin_meta
    }

    /// Baseline size of the watched address's unconfirmed set.
    pub fn unconfirmed_count(&self) -> Option<u32> {
        self.unconfirmed_count
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether a click has something to pay: a non-zero fixed amount or
    /// non-zero computed satoshis.
    pub fn amount_resolved(&self, config: &PaymentRequestConfig) -> bool {
        config.amount.is_some_and(|amount| !amount.is_zero()) || self.satoshis.is_some_and(|s| s > 0)
    }

    pub(crate) fn require_install(&mut self) {
        self.step = ButtonState::InstallRequired;
    }

    pub(crate) fn require_login(&mut self) {
        self.step = ButtonState::LoginRequired;
    }

    /// LoginRequired -> Fresh.
    pub(crate) fn login_resolved(&mut self) -> bool {
        self.transition(ButtonState::LoginRequired, ButtonState::Fresh)
    }

    /// Any clickable step -> Pending.
    pub(crate) fn begin_payment(&mut self) -> bool {
        if !self.step.accepts_click() {
            return false;
        }
        self.step = ButtonState::Pending;
        true
    }

    /// Pending -> Fresh.
    pub(crate) fn payment_rejected(&mut self) -> bool {
        self.transition(ButtonState::Pending, ButtonState::Fresh)
    }

    /// Pending -> Complete for the provider, any -> Complete for the watcher.
    ///
    /// The provider path bumps the unconfirmed baseline so that the watcher
    /// does not count the same transaction a second time.
    pub(crate) fn payment_completed(&mut self, via: Completion) -> bool {
        match via {
            Completion::Provider => {
                if !self.transition(ButtonState::Pending, ButtonState::Complete) {
                    return false;
                }
                self.unconfirmed_count = self.unconfirmed_count.map(|count| count.saturating_add(1));
                true
            }
            Completion::Watcher => {
                self.step = ButtonState::Complete;
                true
            }
        }
    }

    /// Complete -> Fresh.
    pub(crate) fn repeat_elapsed(&mut self) -> bool {
        self.transition(ButtonState::Complete, ButtonState::Fresh)
    }

    /// Record a fresh unconfirmed count and report how it compares with the
    /// previous baseline. The count always becomes the new baseline.
    pub(crate) fn observe_unconfirmed(&mut self, initial: bool, count: u32) -> Observation {
        let observation = if initial {
            Observation::Baseline
        } else {
            classify_unconfirmed(self.unconfirmed_count, count)
        };
        self.unconfirmed_count = Some(count);
        observation
    }

    pub(crate) fn clear_unconfirmed(&mut self) {
        self.unconfirmed_count = None;
    }

    pub(crate) fn set_satoshis(&mut self, satoshis: u64) {
        self.satoshis = Some(satoshis);
    }

    pub(crate) fn clear_satoshis(&mut self) {
        self.satoshis = None;
    }

    pub(crate) fn set_coin_meta(&mut self, meta: CoinMeta) {
        self.coin_meta = meta;
    }

    pub(crate) fn clear_coin_meta(&mut self) {
        self.coin_meta = CoinMeta::unset();
    }

    pub(crate) fn push_error(&mut self, error: impl ToString) {
        self.errors.push(error.to_string());
    }

    fn transition(&mut self, from: ButtonState, to: ButtonState) -> bool {
        if self.step != from {
            return false;
        }
        self.step = to;
        true
    }
}
