use super::{CollaboratorError, PriceFeed, TokenMetadataSource, UnconfirmedSource};
use async_trait::async_trait;
use compact_str::CompactString;
use kanau::processor::Processor;
use paybutton_sdk::client::{ClientError, ExplorerClient};
use paybutton_sdk::config::Endpoints;
use paybutton_sdk::objects::{PriceQuote, TokenInfo, UnconfirmedTransaction};

/// HTTP-backed implementation of the read-only collaborators.
pub struct ExplorerProcessor {
    pub client: ExplorerClient,
}

impl ExplorerProcessor {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: ExplorerClient::new(endpoints),
        }
    }
}

#[derive(Debug, Clone)]
/// Get the current price of the native coin in `currency`.
pub struct GetPriceQuote {
    pub currency: CompactString,
}

#[derive(Debug, Clone)]
/// Get symbol, name and decimals of a token.
pub struct GetTokenInfo {
    pub token_id: String,
}

#[derive(Debug, Clone)]
/// Get the unsettled transactions paying an address.
pub struct GetAddressUnconfirmed {
    pub address: String,
}

impl Processor<GetPriceQuote> for ExplorerProcessor {
    type Output = PriceQuote;
    type Error = ClientError;
    #[tracing::instrument(skip_all, err, name = "HTTP:GetPriceQuote")]
    async fn process(&self, query: GetPriceQuote) -> Result<PriceQuote, ClientError> {
        self.client.get_price(&query.currency).await
    }
}

impl Processor<GetTokenInfo> for ExplorerProcessor {
    type Output = TokenInfo;
    type Error = ClientError;
    #[tracing::instrument(skip_all, err, name = "HTTP:GetTokenInfo")]
    async fn process(&self, query: GetTokenInfo) -> Result<TokenInfo, ClientError> {
        self.client.get_token_info(&query.token_id).await
    }
}

impl Processor<GetAddressUnconfirmed> for ExplorerProcessor {
    type Output = Vec<UnconfirmedTransaction>;
    type Error = ClientError;
    #[tracing::instrument(skip_all, err, name = "HTTP:GetAddressUnconfirmed")]
    async fn process(
        &self,
        query: GetAddressUnconfirmed,
    ) -> Result<Vec<UnconfirmedTransaction>, ClientError> {
        self.client.get_address_unconfirmed(&query.address).await
    }
}

#[async_trait]
impl PriceFeed for ExplorerProcessor {
    async fn price(&self, currency: &str) -> Result<PriceQuote, CollaboratorError> {
        let query = GetPriceQuote {
            currency: currency.into(),
        };
        Ok(self.process(query).await?)
    }
}

#[async_trait]
impl TokenMetadataSource for ExplorerProcessor {
    async fn token_info(&self, token_id: &str) -> Result<TokenInfo, CollaboratorError> {
        let query = GetTokenInfo {
            token_id: token_id.to_owned(),
        };
        match self.process(query).await {
            Ok(info) => Ok(info),
            Err(e) if e.is_not_found() => Err(CollaboratorError::NotFound(format!("token {token_id}"))),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl UnconfirmedSource for ExplorerProcessor {
    async fn unconfirmed(&self, address: &str) -> Result<Vec<UnconfirmedTransaction>, CollaboratorError> {
        let query = GetAddressUnconfirmed {
            address: address.to_owned(),
        };
        Ok(self.process(query).await?)
    }
}
