//! Fiat and decimal-precision conversion into smallest units.

use crate::collaborators::PriceFeed;
use paybutton_sdk::objects::CurrencyCode;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::debug;

/// Satoshis in one whole native coin.
pub const SATOSHIS_PER_COIN: u64 = 100_000_000;

/// The price feed quotes in hundredths of the fiat currency.
const QUOTE_UNITS_PER_FIAT: u64 = 100;

/// Errors that can occur while converting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The feed failed or returned no positive price.
    #[error("no usable {currency} price: {reason}")]
    PriceUnavailable { currency: CurrencyCode, reason: String },

    /// The result is negative or does not fit in a `u64`.
    #[error("amount {0} is out of range for smallest units")]
    OutOfRange(Decimal),
}

/// Convert a fiat price into satoshis using the feed's current quote.
///
/// The caller keeps its previous amount on error; a transient feed failure
/// must not clear a good value.
pub async fn fiat_to_smallest_unit(
    feed: &dyn PriceFeed,
    currency: &str,
    fiat_price: Decimal,
) -> Result<u64, ConversionError> {
    let quote = feed
        .price(currency)
        .await
        .map_err(|e| ConversionError::PriceUnavailable {
            currency: currency.into(),
            reason: e.to_string(),
        })?;

    let Some(quoted) = quote.usable_price() else {
        return Err(ConversionError::PriceUnavailable {
            currency: currency.into(),
            reason: "feed returned no price".to_owned(),
        });
    };

    let satoshis = satoshis_for_quote(fiat_price, quoted)?;
    debug!(
        %currency,
        %fiat_price,
        %quoted,
        quoted_at = ?quote.quoted_at(),
        satoshis,
        "Converted fiat price"
    );
    Ok(satoshis)
}

/// `fiat_price / (quoted / 100) * 1e8`, rounded half away from zero.
///
/// `quoted` is the feed's price of one whole coin in hundredths of the fiat
/// currency and must be positive.
pub fn satoshis_for_quote(fiat_price: Decimal, quoted: Decimal) -> Result<u64, ConversionError> {
    let scaled = fiat_price
        .checked_mul(Decimal::from(SATOSHIS_PER_COIN))
        .and_then(|v| v.checked_mul(Decimal::from(QUOTE_UNITS_PER_FIAT)))
        .and_then(|v| v.checked_div(quoted))
        .ok_or(ConversionError::OutOfRange(fiat_price))?;

    let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_u64().ok_or(ConversionError::OutOfRange(rounded))
}

/// `amount * 10^decimals`, rounded to the nearest integer.
///
/// Returns `None` while either input is unknown, and for negative or
/// unrepresentable results.
pub fn scale_by_decimals(amount: Option<Decimal>, decimals: Option<u8>) -> Option<u64> {
    let amount = amount?;
    let decimals = decimals?;
    let factor = (0..decimals).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(Decimal::TEN))?;
    amount
        .checked_mul(factor)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CollaboratorError;
    use async_trait::async_trait;
    use paybutton_sdk::objects::PriceQuote;
    use std::str::FromStr;

    struct FixedFeed(Option<Decimal>);

    #[async_trait]
    impl PriceFeed for FixedFeed {
        async fn price(&self, _currency: &str) -> Result<PriceQuote, CollaboratorError> {
            Ok(PriceQuote {
                price: self.0,
                stamp: 1,
            })
        }
    }

    struct BrokenFeed;

    #[async_trait]
    impl PriceFeed for BrokenFeed {
        async fn price(&self, currency: &str) -> Result<PriceQuote, CollaboratorError> {
            Err(CollaboratorError::NotFound(format!("price for {currency}")))
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_five_dollars_at_five_dollars_per_coin() {
        let feed = FixedFeed(Some(dec("500")));
        let satoshis = fiat_to_smallest_unit(&feed, "USD", dec("5")).await.unwrap();
        assert_eq!(satoshis, 100_000_000);
    }

    #[tokio::test]
    async fn test_missing_price_is_unavailable() {
        let err = fiat_to_smallest_unit(&FixedFeed(None), "USD", dec("5")).await.unwrap_err();
        assert!(matches!(err, ConversionError::PriceUnavailable { ref currency, .. } if currency.as_str() == "USD"));

        let err = fiat_to_smallest_unit(&BrokenFeed, "EUR", dec("5")).await.unwrap_err();
        assert!(matches!(err, ConversionError::PriceUnavailable { .. }));
    }

    #[test]
    fn test_satoshis_for_quote_rounds_to_nearest() {
        // 1 USD at 300.00 USD/coin = 333333.33... satoshis
        assert_eq!(satoshis_for_quote(dec("1"), dec("30000")).unwrap(), 333_333);
        // 0.01 USD at 0.03 USD/coin = 33333333.33... satoshis
        assert_eq!(satoshis_for_quote(dec("0.01"), dec("3")).unwrap(), 33_333_333);
        // exact midpoint rounds away from zero
        assert_eq!(satoshis_for_quote(dec("0.000000005"), dec("100")).unwrap(), 1);
    }

    #[test]
    fn test_negative_fiat_price_is_out_of_range() {
        assert!(matches!(
            satoshis_for_quote(dec("-1"), dec("500")),
            Err(ConversionError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_scale_by_decimals() {
        assert_eq!(scale_by_decimals(Some(dec("1.5")), Some(8)), Some(150_000_000));
        assert_eq!(scale_by_decimals(Some(dec("2.25")), Some(1)), Some(23));
        assert_eq!(scale_by_decimals(Some(dec("7")), Some(0)), Some(7));
    }

    #[test]
    fn test_scale_by_decimals_unknown_inputs() {
        assert_eq!(scale_by_decimals(None, Some(8)), None);
        assert_eq!(scale_by_decimals(Some(dec("1")), None), None);
        assert_eq!(scale_by_decimals(Some(dec("-1")), Some(2)), None);
        assert_eq!(scale_by_decimals(Some(dec("1")), Some(40)), None);
    }

    #[test]
    fn test_scale_by_decimals_is_stable_and_monotonic() {
        let amounts = ["0", "0.0001", "0.5", "1", "1.00005", "42", "1000000"];
        for decimals in [0u8, 2, 4, 8] {
            let mut previous = None;
            for amount in amounts {
                let first = scale_by_decimals(Some(dec(amount)), Some(decimals));
                let second = scale_by_decimals(Some(dec(amount)), Some(decimals));
                assert_eq!(first, second);
                if let (Some(prev), Some(current)) = (previous, first) {
                    assert!(current >= prev, "{amount} scaled by {decimals} decreased");
                }
                previous = first;
            }
        }
    }
}
