//! Response shapes of the price feed, token metadata and unconfirmed
//! transaction endpoints.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of one whole native coin, quoted in hundredths of the requested
/// fiat currency (cents for `USD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Unix timestamp (seconds) of the quote.
    #[serde(default)]
    pub stamp: i64,
}

impl PriceQuote {
    /// The quoted price, if the feed returned a positive one.
    pub fn usable_price(&self) -> Option<Decimal> {
        self.price.filter(|price| price.is_sign_positive() && !price.is_zero())
    }

    /// When the quote was taken.
    pub fn quoted_at(&self) -> Option<time::OffsetDateTime> {
        time::OffsetDateTime::from_unix_timestamp(self.stamp).ok()
    }
}

/// Token metadata as returned by the token list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: CompactString,
    pub decimals: u8,
    pub name: String,
}

/// Body of the unconfirmed-transaction lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconfirmedResponse {
    #[serde(default)]
    pub utxos: Vec<UnconfirmedTransaction>,
}

/// One unsettled output paying the looked-up address.
///
/// Only the number of records matters to the address watcher; the fields are
/// kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconfirmedTransaction {
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub satoshis: Option<u64>,
    #[serde(default)]
    pub confirmations: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_quote_parsing() {
        let quote: PriceQuote = serde_json::from_str(r#"{"price": 500, "stamp": 1546300800}"#).unwrap();
        assert_eq!(quote.usable_price(), Some(Decimal::from(500)));
        assert_eq!(quote.quoted_at().unwrap().year(), 2019);

        let fractional: PriceQuote = serde_json::from_str(r#"{"price": 31012.5, "stamp": 0}"#).unwrap();
        assert_eq!(fractional.usable_price(), Some(Decimal::from_str("31012.5").unwrap()));
    }

    #[test]
    fn test_price_quote_without_price_is_unusable() {
        let missing: PriceQuote = serde_json::from_str(r#"{"stamp": 1}"#).unwrap();
        assert_eq!(missing.usable_price(), None);

        let zero: PriceQuote = serde_json::from_str(r#"{"price": 0, "stamp": 1}"#).unwrap();
        assert_eq!(zero.usable_price(), None);
    }

    #[test]
    fn test_unconfirmed_response_parsing() {
        let body = r#"{
            "utxos": [
                {"txid": "aa", "vout": 0, "satoshis": 1000, "confirmations": 0},
                {"txid": "bb", "vout": 1}
            ],
            "legacyAddress": "1abc"
        }"#;
        let response: UnconfirmedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.utxos.len(), 2);
        assert_eq!(response.utxos[1].satoshis, None);
    }
}
