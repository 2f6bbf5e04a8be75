use super::payload::rendered_amount;
use super::state::{ButtonState, ControllerState};
use crate::config::PaymentRequestConfig;
use paybutton_sdk::objects::{CoinMeta, payment_uri};
use serde::Serialize;

/// What the presentational layer draws.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderState {
    /// The step override if one is configured, else the computed step.
    pub step: ButtonState,
    /// Amount in the coin's smallest units.
    pub amount: Option<u64>,
    pub coin_meta: CoinMeta,
    pub show_qr: bool,
    /// Present only when `show_qr` is.
    pub payment_uri: Option<String>,
    /// Non-fatal warnings, oldest first.
    pub errors: Vec<String>,
}

impl RenderState {
    pub fn compute(config: &PaymentRequestConfig, state: &ControllerState) -> Self {
        let amount = rendered_amount(config, state);
        let show_qr = config.qr_eligible();
        Self {
            step: config.step_override.unwrap_or(state.step()),
            amount,
            coin_meta: state.coin_meta().clone(),
            show_qr,
            payment_uri: show_qr.then(|| payment_uri(&config.destination, amount)),
            errors: state.errors().to_vec(),
        }
    }
}
