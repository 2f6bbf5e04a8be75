//! TOML file configuration structures.
//!
//! These structs map directly to the `paybutton.toml` file format.

use paybutton_core::config::{ControllerSettings, PaymentRequestConfig};
use paybutton_sdk::config::Endpoints;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// The payment request to mount.
    pub request: PaymentRequestConfig,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Poll intervals and the install page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub price_refresh_secs: u64,
    pub login_poll_ms: u64,
    pub address_watch_secs: u64,
    pub price_debounce_ms: u64,
    pub install_url: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let defaults = ControllerSettings::default();
        Self {
            price_refresh_secs: defaults.price_refresh_interval.as_secs(),
            login_poll_ms: millis(defaults.login_poll_interval),
            address_watch_secs: defaults.address_watch_interval.as_secs(),
            price_debounce_ms: millis(defaults.price_debounce_window),
            install_url: defaults.install_url,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl From<ControllerConfig> for ControllerSettings {
    fn from(c: ControllerConfig) -> Self {
        Self {
            price_refresh_interval: Duration::from_secs(c.price_refresh_secs),
            login_poll_interval: Duration::from_millis(c.login_poll_ms),
            address_watch_interval: Duration::from_secs(c.address_watch_secs),
            price_debounce_window: Duration::from_millis(c.price_debounce_ms),
            install_url: c.install_url,
        }
    }
}
