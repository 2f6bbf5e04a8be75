//! Collaborator endpoint configuration.

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_PRICE_BASE: &str = "https://index-api.bitcoin.com/api/v0/cash/price";
const DEFAULT_TOKEN_BASE: &str = "https://rest.bitcoin.com/v2/slp/list";
const DEFAULT_UNCONFIRMED_BASE: &str = "https://rest.bitcoin.com/v2/address/unconfirmed";

/// Base URLs of the three HTTP collaborators.
///
/// Each request appends one percent-encoded path segment to its base:
/// the currency code, the token id, or the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Price-by-currency feed, `GET {price}/{currency}`.
    pub price: String,
    /// Token metadata lookup, `GET {token}/{token_id}`.
    pub token: String,
    /// Unconfirmed-transaction lookup, `GET {unconfirmed}/{address}`.
    pub unconfirmed: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            price: DEFAULT_PRICE_BASE.to_owned(),
            token: DEFAULT_TOKEN_BASE.to_owned(),
            unconfirmed: DEFAULT_UNCONFIRMED_BASE.to_owned(),
        }
    }
}

impl Endpoints {
    pub fn price_url(&self, currency: &str) -> Result<Url, url::ParseError> {
        join_segment(&self.price, currency)
    }

    pub fn token_url(&self, token_id: &str) -> Result<Url, url::ParseError> {
        join_segment(&self.token, token_id)
    }

    pub fn unconfirmed_url(&self, address: &str) -> Result<Url, url::ParseError> {
        join_segment(&self.unconfirmed, address)
    }
}

fn join_segment(base: &str, segment: &str) -> Result<Url, url::ParseError> {
    let base = base.trim_end_matches('/');
    Url::parse(&format!("{base}/{}", urlencoding::encode(segment)))
}
