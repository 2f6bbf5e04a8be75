//! Amount composition and the provider transaction payload.

use super::state::ControllerState;
use crate::config::PaymentRequestConfig;
use crate::conversion::scale_by_decimals;
use paybutton_sdk::objects::{CoinMeta, CoinType, TransactionPayload};
use rust_decimal::Decimal;

/// The `value` handed to the provider.
///
/// A fixed native amount is converted to satoshis; a fixed token amount is
/// passed in token units; otherwise the computed satoshis are used.
pub fn calculated_value(config: &PaymentRequestConfig, satoshis: Option<u64>) -> Option<Decimal> {
    match (config.coin_type, config.amount) {
        (CoinType::Native, Some(amount)) if !amount.is_zero() => {
            scale_by_decimals(Some(amount), Some(CoinMeta::NATIVE_DECIMALS)).map(Decimal::from)
        }
        (CoinType::Token, Some(amount)) if !amount.is_zero() => Some(amount),
        _ => satoshis.filter(|s| *s > 0).map(Decimal::from),
    }
}

/// Compose `{to, from, value}` plus the token and auxiliary data extensions.
pub fn build_payload(config: &PaymentRequestConfig, account: &str, value: Decimal) -> TransactionPayload {
    let mut payload = TransactionPayload::new(config.destination.as_str(), account, value);
    if config.coin_type == CoinType::Token {
        if let Some(token_id) = config.token_id.as_deref() {
            payload = payload.with_token(token_id);
        }
    }
    if let Some(data) = config.op_return() {
        payload = payload.with_op_return(data.to_vec());
    }
    payload
}

/// The amount shown to the user, in the coin's smallest units.
///
/// A fixed amount waits for the coin's decimals to be known; a fiat price
/// uses the computed satoshis.
pub fn rendered_amount(config: &PaymentRequestConfig, state: &ControllerState) -> Option<u64> {
    scale_by_decimals(config.amount, state.coin_meta().decimals)
        .filter(|units| *units > 0)
        .or(state.satoshis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybutton_sdk::objects::TokenInfo;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_value_for_fiat_price_uses_satoshis() {
        let config = PaymentRequestConfig::new("q").with_price("USD", dec("5"));
        assert_eq!(calculated_value(&config, Some(100_000_000)), Some(dec("100000000")));
        assert_eq!(calculated_value(&config, None), None);
    }

    #[test]
    fn test_value_for_fixed_amounts() {
        let native = PaymentRequestConfig::new("q").with_amount(dec("0.0005"));
        assert_eq!(calculated_value(&native, Some(1)), Some(dec("50000")));

        let token = PaymentRequestConfig::new("q").with_token("abc").with_amount(dec("2.5"));
        assert_eq!(calculated_value(&token, None), Some(dec("2.5")));
    }

    #[test]
    fn test_token_payload_keeps_both_extensions() {
        let config = PaymentRequestConfig::new("bitcoincash:qrecv")
            .with_token("abc")
            .with_amount(dec("2.5"))
            .with_op_return(vec!["6d02".to_owned(), "hello".to_owned()]);
        let payload = build_payload(&config, "bitcoincash:qpayer", dec("2.5"));

        assert_eq!(payload.to, "bitcoincash:qrecv");
        assert_eq!(payload.from, "bitcoincash:qpayer");
        assert_eq!(payload.send_token_data.unwrap().token_id, "abc");
        assert_eq!(payload.op_return.unwrap().data, vec!["6d02", "hello"]);
    }

    #[test]
    fn test_native_payload_has_no_token_extension() {
        let config = PaymentRequestConfig {
            token_id: Some("stray".to_owned()),
            ..PaymentRequestConfig::new("q").with_amount(dec("1"))
        };
        let payload = build_payload(&config, "a", dec("100000000"));
        assert!(payload.send_token_data.is_none());
        assert!(payload.op_return.is_none());
    }

    #[test]
    fn test_rendered_amount_waits_for_decimals() {
        let config = PaymentRequestConfig::new("q").with_token("abc").with_amount(dec("1.5"));
        let mut state = ControllerState::new();
        assert_eq!(rendered_amount(&config, &state), None);

        state.set_coin_meta(CoinMeta::from(TokenInfo {
            symbol: "T".into(),
            decimals: 2,
            name: "Token".to_owned(),
        }));
        assert_eq!(rendered_amount(&config, &state), Some(150));
    }

    #[test]
    fn test_rendered_amount_falls_back_to_satoshis() {
        let config = PaymentRequestConfig::new("q").with_price("USD", dec("5"));
        let mut state = ControllerState::new();
        state.set_coin_meta(CoinMeta::native());
        state.set_satoshis(100_000_000);
        assert_eq!(rendered_amount(&config, &state), Some(100_000_000));
    }
}
