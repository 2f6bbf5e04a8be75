use crate::controller::ButtonState;
use paybutton_sdk::objects::{CoinType, CurrencyCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay before a completed, repeatable request becomes clickable
/// again.
pub const DEFAULT_REPEAT_TIMEOUT_MS: u32 = 4_000;

/// Payment parameters supplied by the host page.
///
/// Either `price` (in `currency`) or `amount` (in the coin's own units)
/// prices the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRequestConfig {
    /// Recipient address.
    pub destination: String,
    pub currency: CurrencyCode,
    /// Fiat-denominated target price.
    pub price: Option<Decimal>,
    pub coin_type: CoinType,
    /// Required when `coin_type` is [`CoinType::Token`].
    pub token_id: Option<String>,
    /// Absolute amount in the coin's or token's units.
    pub amount: Option<Decimal>,
    pub is_repeatable: bool,
    pub repeat_timeout_ms: u32,
    /// Poll the destination's unconfirmed set and treat growth as payment.
    pub watch_address: bool,
    /// Auxiliary payload segments.
    pub op_return_data: Option<Vec<String>>,
    /// Intent to show a QR code; see [`PaymentRequestConfig::qr_eligible`].
    pub show_qr: bool,
    /// Force the displayed state, bypassing the computed one.
    pub step_override: Option<ButtonState>,
}

impl Default for PaymentRequestConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            currency: CurrencyCode::const_new("USD"),
            price: None,
            coin_type: CoinType::Native,
            token_id: None,
            amount: None,
            is_repeatable: false,
            repeat_timeout_ms: DEFAULT_REPEAT_TIMEOUT_MS,
            watch_address: false,
            op_return_data: None,
            show_qr: true,
            step_override: None,
        }
    }
}

impl PaymentRequestConfig {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Price the request in fiat.
    pub fn with_price(mut self, currency: &str, price: Decimal) -> Self {
        self.currency = currency.into();
        self.price = Some(price);
        self
    }

    /// Price the request in the coin's own units.
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Pay in a token instead of the native coin.
    pub fn with_token(mut self, token_id: impl Into<String>) -> Self {
        self.coin_type = CoinType::Token;
        self.token_id = Some(token_id.into());
        self
    }

    pub fn repeatable(mut self, timeout_ms: u32) -> Self {
        self.is_repeatable = true;
        self.repeat_timeout_ms = timeout_ms;
        self
    }

    pub fn watching(mut self) -> Self {
        self.watch_address = true;
        self
    }

    pub fn with_op_return(mut self, data: Vec<String>) -> Self {
        self.op_return_data = Some(data);
        self
    }

    pub fn with_show_qr(mut self, show_qr: bool) -> Self {
        self.show_qr = show_qr;
        self
    }

    pub fn with_step_override(mut self, step: ButtonState) -> Self {
        self.step_override = Some(step);
        self
    }

    pub fn repeat_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.repeat_timeout_ms))
    }

    /// Auxiliary data segments, if any are set.
    pub fn op_return(&self) -> Option<&[String]> {
        self.op_return_data
            .as_deref()
            .filter(|data| !data.is_empty())
    }

    /// Whether a QR code can represent this request.
    ///
    /// Token transfers and auxiliary data cannot be encoded in a payment
    /// URI, so QR is suppressed for them whatever the caller asked for.
    pub fn qr_eligible(&self) -> bool {
        self.show_qr && self.coin_type == CoinType::Native && self.op_return().is_none()
    }

    /// Whether a price change between `self` and `other` requires a fresh
    /// fiat conversion.
    pub(crate) fn price_target_changed(&self, other: &Self) -> bool {
        self.currency != other.currency || self.price != other.price
    }

    pub(crate) fn token_changed(&self, other: &Self) -> bool {
        self.coin_type != other.coin_type || self.token_id != other.token_id
    }

    pub(crate) fn watch_changed(&self, other: &Self) -> bool {
        self.watch_address != other.watch_address
            || (self.watch_address && self.destination != other.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = PaymentRequestConfig::new("bitcoincash:qrecv");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.coin_type, CoinType::Native);
        assert!(config.show_qr);
        assert!(!config.is_repeatable);
        assert_eq!(config.repeat_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_qr_eligibility() {
        let native = PaymentRequestConfig::new("q").with_price("USD", Decimal::ONE);
        assert!(native.qr_eligible());
        assert!(!native.clone().with_show_qr(false).qr_eligible());

        let token = PaymentRequestConfig::new("q").with_token("abc").with_amount(Decimal::ONE);
        assert!(!token.qr_eligible());

        let with_data = native.clone().with_op_return(vec!["6d02".to_owned()]);
        assert!(!with_data.qr_eligible());

        let empty_data = native.with_op_return(Vec::new());
        assert!(empty_data.qr_eligible());
    }

    #[test]
    fn test_change_detection() {
        let base = PaymentRequestConfig::new("q").with_price("USD", Decimal::from(5));

        let eur = base.clone().with_price("EUR", Decimal::from(5));
        assert!(base.price_target_changed(&eur));
        assert!(!base.token_changed(&eur));
        assert!(!base.watch_changed(&eur));

        let moved = PaymentRequestConfig {
            destination: "other".to_owned(),
            ..base.clone()
        };
        assert!(!base.watch_changed(&moved));
        assert!(base.clone().watching().watch_changed(&moved.watching()));

        let cheaper = base.clone().with_price("USD", Decimal::from_str("4.99").unwrap());
        assert!(base.price_target_changed(&cheaper));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: PaymentRequestConfig = serde_json::from_str(
            r#"{"destination": "q", "coin_type": "SLP", "token_id": "abc", "amount": "2.5", "step_override": "login"}"#,
        )
        .unwrap();
        assert_eq!(config.coin_type, CoinType::Token);
        assert_eq!(config.amount, Some(Decimal::from_str("2.5").unwrap()));
        assert_eq!(config.step_override, Some(ButtonState::LoginRequired));
        assert_eq!(config.repeat_timeout_ms, DEFAULT_REPEAT_TIMEOUT_MS);
    }
}
