//! Terminal stand-ins for the page hosting the widget.

use paybutton_core::RenderState;
use paybutton_core::collaborators::{HostEnvironment, PaymentCallbacks, TransactionRejected};
use paybutton_sdk::objects::TxReceipt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A host with no browser. URLs are printed for the user to open.
pub struct TerminalHost;

impl HostEnvironment for TerminalHost {
    fn open_url(&self, url: &str) {
        tracing::warn!(url, "No wallet provider found, install one from this page");
    }
}

/// Outcome callbacks that log.
pub struct LoggingCallbacks;

impl PaymentCallbacks for LoggingCallbacks {
    fn on_success(&self, receipt: Option<&TxReceipt>) {
        match receipt {
            Some(receipt) => tracing::info!(txid = %receipt.txid, "Payment succeeded"),
            None => tracing::info!("Payment detected on the watched address"),
        }
    }

    fn on_failure(&self, error: &TransactionRejected) {
        tracing::warn!(reason = %error.reason, "Payment failed");
    }
}

/// Log every rendered state until the controller goes away.
pub fn spawn_render_logger(mut render_rx: watch::Receiver<RenderState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reported_errors = 0;
        loop {
            {
                let render = render_rx.borrow_and_update();
                tracing::info!(
                    step = ?render.step,
                    amount = ?render.amount,
                    symbol = ?render.coin_meta.symbol,
                    payment_uri = ?render.payment_uri,
                    "Render state"
                );
                for error in new_warnings(&render.errors, &mut reported_errors) {
                    tracing::warn!(error = %error, "Controller warning");
                }
            }
            if render_rx.changed().await.is_err() {
                tracing::debug!("Render logger shutting down");
                break;
            }
        }
    })
}

/// Warnings appended since the last call. The list only grows while the
/// controller is mounted.
fn new_warnings<'a>(errors: &'a [String], reported: &mut usize) -> &'a [String] {
    let fresh = errors.get(*reported..).unwrap_or_default();
    *reported = errors.len();
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_warning_is_reported_once() {
        let mut reported = 0;
        let mut errors = vec!["metadata unavailable for token nope".to_owned()];

        assert_eq!(new_warnings(&errors, &mut reported), &errors[..]);
        assert!(new_warnings(&errors, &mut reported).is_empty());

        errors.push("metadata unavailable for token other".to_owned());
        assert_eq!(new_warnings(&errors, &mut reported), &errors[1..]);
        assert!(new_warnings(&errors, &mut reported).is_empty());
    }
}
