pub mod coins;
pub mod explorer;
pub mod transaction;
pub mod uri;

pub use coins::{CoinMeta, CoinType, CurrencyCode, TOKEN_PROTOCOL};
pub use explorer::{PriceQuote, TokenInfo, UnconfirmedResponse, UnconfirmedTransaction};
pub use transaction::{OpReturn, SendTokenData, TransactionPayload, TxReceipt};
pub use uri::{URI_SCHEME, payment_uri};

/// Serializes a decimal as a plain JSON number.
///
/// Integral values are written without a fractional part so that amounts in
/// smallest units reach the provider as `100000000` rather than `100000000.0`.
pub(crate) mod json_number {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::{Deserializer, Serializer, ser::Error};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = value.normalize();
        if normalized.scale() == 0 {
            if let Some(whole) = normalized.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        match normalized.to_f64() {
            Some(float) => serializer.serialize_f64(float),
            None => Err(S::Error::custom("decimal is out of range for a JSON number")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer)
    }
}
