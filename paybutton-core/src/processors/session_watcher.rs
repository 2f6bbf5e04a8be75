//! Wallet provider detection and the login poll.

use crate::collaborators::{ProviderHandle, ProviderLocator};
use crate::events::{ControllerEvent, ControllerEventSender};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What the host environment currently offers.
pub enum Session {
    /// No provider is injected.
    ProviderAbsent,
    /// A provider is injected but nobody is logged in.
    AccountAbsent(ProviderHandle),
    /// A provider with an authenticated account.
    Ready {
        provider: ProviderHandle,
        account: String,
    },
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::ProviderAbsent => f.write_str("ProviderAbsent"),
            Session::AccountAbsent(_) => f.write_str("AccountAbsent"),
            Session::Ready { account, .. } => f.debug_struct("Ready").field("account", account).finish(),
        }
    }
}

pub fn detect_provider(locator: &dyn ProviderLocator) -> Option<ProviderHandle> {
    locator.current_provider()
}

/// Read the provider and its default account once.
///
/// An empty account string counts as no account.
pub fn detect_session(locator: &dyn ProviderLocator) -> Session {
    let Some(provider) = detect_provider(locator) else {
        return Session::ProviderAbsent;
    };
    match current_account(&provider) {
        Some(account) => Session::Ready { provider, account },
        None => Session::AccountAbsent(provider),
    }
}

fn current_account(provider: &ProviderHandle) -> Option<String> {
    provider.default_account().filter(|account| !account.is_empty())
}

/// Poll every `interval` until an account appears, report it, then stop.
///
/// The provider is looked up again on every tick since it may come and go.
pub fn spawn_account_poll(
    locator: Arc<dyn ProviderLocator>,
    interval: Duration,
    events: ControllerEventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(provider) = detect_provider(locator.as_ref()) else {
                debug!("Provider missing during login poll");
                continue;
            };
            let Some(account) = current_account(&provider) else {
                debug!("Still waiting for login");
                continue;
            };

            info!(%account, "Account detected");
            if let Err(e) = events.send(ControllerEvent::AccountDetected { account }).await {
                warn!(error = %e, "Failed to report account, controller gone");
            }
            return;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{TransactionRejected, WalletProvider};
    use crate::events::controller_event_channel;
    use async_trait::async_trait;
    use paybutton_sdk::objects::{TransactionPayload, TxReceipt};
    use std::sync::Mutex;

    struct Provider {
        account: Mutex<Option<String>>,
    }

    #[async_trait]
    impl WalletProvider for Provider {
        fn default_account(&self) -> Option<String> {
            self.account.lock().unwrap().clone()
        }

        async fn send_transaction(&self, _payload: TransactionPayload) -> Result<TxReceipt, TransactionRejected> {
            Err(TransactionRejected::new("unused"))
        }
    }

    #[derive(Default)]
    struct Locator {
        provider: Mutex<Option<Arc<Provider>>>,
    }

    impl Locator {
        fn install(&self, account: Option<&str>) -> Arc<Provider> {
            let provider = Arc::new(Provider {
                account: Mutex::new(account.map(str::to_owned)),
            });
            *self.provider.lock().unwrap() = Some(provider.clone());
            provider
        }

        fn uninstall(&self) {
            *self.provider.lock().unwrap() = None;
        }
    }

    impl ProviderLocator for Locator {
        fn current_provider(&self) -> Option<ProviderHandle> {
            self.provider
                .lock()
                .unwrap()
                .clone()
                .map(|p| p as ProviderHandle)
        }
    }

    #[test]
    fn test_detect_session() {
        let locator = Locator::default();
        assert!(matches!(detect_session(&locator), Session::ProviderAbsent));

        locator.install(None);
        assert!(matches!(detect_session(&locator), Session::AccountAbsent(_)));

        locator.install(Some(""));
        assert!(matches!(detect_session(&locator), Session::AccountAbsent(_)));

        locator.install(Some("bitcoincash:qpayer"));
        assert!(matches!(
            detect_session(&locator),
            Session::Ready { ref account, .. } if account == "bitcoincash:qpayer"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_reports_account_once_and_stops() {
        let locator = Arc::new(Locator::default());
        let provider = locator.install(None);
        let (tx, mut rx) = controller_event_channel();

        let handle = spawn_account_poll(locator.clone(), Duration::from_secs(1), tx);
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(rx.try_recv().is_err());

        *provider.account.lock().unwrap() = Some("bitcoincash:qpayer".to_owned());
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ControllerEvent::AccountDetected { ref account } if account == "bitcoincash:qpayer"));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.is_finished());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tolerates_provider_coming_and_going() {
        let locator = Arc::new(Locator::default());
        let (tx, mut rx) = controller_event_channel();

        let handle = spawn_account_poll(locator.clone(), Duration::from_secs(1), tx);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        locator.install(None);
        tokio::time::sleep(Duration::from_secs(1)).await;
        locator.uninstall();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!handle.is_finished());

        locator.install(Some("bitcoincash:qother"));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ControllerEvent::AccountDetected { .. }));
    }
}
