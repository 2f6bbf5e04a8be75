use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

pub const PRICE_REFRESH_INTERVAL: Duration = SECOND.saturating_mul(60);
pub const LOGIN_POLL_INTERVAL: Duration = SECOND;
pub const ADDRESS_WATCH_INTERVAL: Duration = SECOND.saturating_mul(10);
pub const PRICE_DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);
pub const INSTALL_URL: &str = "https://badger.bitcoin.com";

/// Controller knobs that stay fixed for a mounted controller's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub price_refresh_interval: Duration,
    pub login_poll_interval: Duration,
    pub address_watch_interval: Duration,
    /// Window in which repeated price refresh requests coalesce.
    pub price_debounce_window: Duration,
    /// Opened when no wallet provider is present.
    pub install_url: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            price_refresh_interval: PRICE_REFRESH_INTERVAL,
            login_poll_interval: LOGIN_POLL_INTERVAL,
            address_watch_interval: ADDRESS_WATCH_INTERVAL,
            price_debounce_window: PRICE_DEBOUNCE_WINDOW,
            install_url: INSTALL_URL.to_owned(),
        }
    }
}
