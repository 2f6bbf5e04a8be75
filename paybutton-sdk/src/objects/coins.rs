use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::explorer::TokenInfo;

/// ISO-like fiat currency code, e.g. `USD`.
pub type CurrencyCode = CompactString;

/// Protocol tag the wallet provider expects on token transfers.
pub const TOKEN_PROTOCOL: &str = "slp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// The asset a payment request is denominated in.
pub enum CoinType {
    /// The chain's native coin, counted in satoshis.
    #[default]
    #[serde(rename = "BCH", alias = "native")]
    Native,
    /// A token identified by its token id.
    #[serde(rename = "SLP", alias = "token")]
    Token,
}

/// Display metadata of the coin being paid.
///
/// Every field is optional because token metadata is fetched asynchronously
/// and is cleared while a lookup for a different token is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMeta {
    pub symbol: Option<CompactString>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

impl CoinMeta {
    /// Precision of the native coin (1 coin = 1e8 satoshis).
    pub const NATIVE_DECIMALS: u8 = 8;

    /// Static metadata of the native coin.
    pub fn native() -> Self {
        Self {
            symbol: Some(CompactString::const_new("BCH")),
            name: Some("Bitcoin Cash".to_owned()),
            decimals: Some(Self::NATIVE_DECIMALS),
        }
    }

    /// Metadata with every field unset.
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_unset(&self) -> bool {
        self.symbol.is_none() && self.name.is_none() && self.decimals.is_none()
    }
}

impl From<TokenInfo> for CoinMeta {
    fn from(info: TokenInfo) -> Self {
        Self {
            symbol: Some(info.symbol),
            name: Some(info.name),
            decimals: Some(info.decimals),
        }
    }
}
