//! Fiat price refresh and coin metadata resolution.

use crate::collaborators::{PriceFeed, TokenMetadataSource};
use crate::conversion::fiat_to_smallest_unit;
use crate::events::{ControllerEvent, ControllerEventSender, Generation};
use paybutton_sdk::objects::{CoinMeta, CoinType, CurrencyCode};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Why coin metadata could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("metadata unavailable: token payment without a token id")]
    MissingTokenId,

    #[error("metadata unavailable for token {token_id}: {reason}")]
    Unavailable { token_id: String, reason: String },
}

/// How to obtain metadata for a coin type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataPlan {
    /// Known without a lookup.
    Static(CoinMeta),
    /// Clear the current metadata and look the token up.
    Fetch(String),
    /// Cannot be resolved; leave metadata unset.
    Missing(MetadataError),
}

pub fn plan_coin_metadata(coin_type: CoinType, token_id: Option<&str>) -> MetadataPlan {
    match (coin_type, token_id) {
        (CoinType::Native, _) => MetadataPlan::Static(CoinMeta::native()),
        (CoinType::Token, Some(id)) if !id.is_empty() => MetadataPlan::Fetch(id.to_owned()),
        (CoinType::Token, _) => MetadataPlan::Missing(MetadataError::MissingTokenId),
    }
}

/// Convert `price` right away and then every `interval`.
///
/// Failed conversions are reported too; the controller keeps its previous
/// amount and the next tick retries.
pub fn spawn_price_refresh(
    feed: Arc<dyn PriceFeed>,
    currency: CurrencyCode,
    price: Decimal,
    interval: Duration,
    generation: Generation,
    events: ControllerEventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            debug!(%currency, %price, generation, "Refreshing fiat conversion");

            let result = fiat_to_smallest_unit(feed.as_ref(), &currency, price).await;
            let event = ControllerEvent::PriceComputed { generation, result };
            if let Err(e) = events.send(event).await {
                warn!(%currency, error = %e, "Failed to report price, controller gone");
                return;
            }
        }
    })
}

/// Look up `token_id` once and report the outcome.
pub fn spawn_metadata_fetch(
    source: Arc<dyn TokenMetadataSource>,
    token_id: String,
    generation: Generation,
    events: ControllerEventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(%token_id, generation, "Fetching token metadata");
        let result = source.token_info(&token_id).await;
        let event = ControllerEvent::MetadataResolved {
            generation,
            token_id,
            result,
        };
        if let Err(e) = events.send(event).await {
            warn!(error = %e, "Failed to report token metadata, controller gone");
        }
    })
}
