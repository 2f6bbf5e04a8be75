//! Client for the price feed, token metadata and unconfirmed-transaction
//! endpoints.

use reqwest::Client;

use super::{ClientError, parse_response};
use crate::config::Endpoints;
use crate::objects::explorer::{PriceQuote, TokenInfo, UnconfirmedResponse, UnconfirmedTransaction};

/// Typed HTTP client for the read-only collaborator endpoints.
///
/// None of the requests is authenticated; every call is a single `GET`
/// whose last path segment is the currency, token id or address.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    endpoints: Endpoints,
}

impl ExplorerClient {
    /// Create a new `ExplorerClient` for the given endpoints.
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }

    /// `GET {price}/{currency}` – current price of one native coin.
    pub async fn get_price(&self, currency: &str) -> Result<PriceQuote, ClientError> {
        let url = self.endpoints.price_url(currency)?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET {token}/{token_id}` – symbol, name and decimals of a token.
    pub async fn get_token_info(&self, token_id: &str) -> Result<TokenInfo, ClientError> {
        let url = self.endpoints.token_url(token_id)?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET {unconfirmed}/{address}` – unsettled outputs paying `address`.
    pub async fn get_address_unconfirmed(
        &self,
        address: &str,
    ) -> Result<Vec<UnconfirmedTransaction>, ClientError> {
        let url = self.endpoints.unconfirmed_url(address)?;
        let resp = self.http.get(url).send().await?;
        let body: UnconfirmedResponse = parse_response(resp).await?;
        Ok(body.utxos)
    }
}
