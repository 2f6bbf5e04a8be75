//! Payment detection by watching the destination's unconfirmed set.
//!
//! The watcher only counts. Any strict increase in the number of unsettled
//! transactions paying the destination is taken as the expected payment:
//! amount, sender and txid are not checked, so an unrelated payment landing
//! at the same time completes the request too.

use crate::collaborators::UnconfirmedSource;
use crate::events::{ControllerEvent, ControllerEventSender, Generation};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// How a fresh count compares with the recorded baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// No baseline yet; the count becomes the baseline.
    Baseline,
    Unchanged,
    /// Transactions settled and left the set.
    Decreased,
    /// A new payment landed.
    Increased,
}

pub fn classify_unconfirmed(baseline: Option<u32>, observed: u32) -> Observation {
    match baseline {
        None => Observation::Baseline,
        Some(b) if observed > b => Observation::Increased,
        Some(b) if observed < b => Observation::Decreased,
        Some(_) => Observation::Unchanged,
    }
}

/// Fetch the unconfirmed set now and then every `interval`.
///
/// The first successful fetch after arming is flagged `initial` so the
/// controller records it as the baseline without comparing.
pub fn spawn_address_watch(
    source: Arc<dyn UnconfirmedSource>,
    address: String,
    interval: Duration,
    generation: Generation,
    events: ControllerEventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut initial = true;

        loop {
            ticker.tick().await;

            let event = match source.unconfirmed(&address).await {
                Ok(transactions) => {
                    let count = u32::try_from(transactions.len()).unwrap_or(u32::MAX);
                    debug!(%address, count, initial, "Fetched unconfirmed set");
                    let event = ControllerEvent::UnconfirmedObserved {
                        generation,
                        initial,
                        count,
                    };
                    initial = false;
                    event
                }
                Err(error) => ControllerEvent::UnconfirmedUnavailable { generation, error },
            };

            if let Err(e) = events.send(event).await {
                warn!(%address, error = %e, "Failed to report unconfirmed set, controller gone");
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CollaboratorError;
    use crate::events::controller_event_channel;
    use async_trait::async_trait;
    use paybutton_sdk::objects::UnconfirmedTransaction;
    use std::sync::Mutex;

    struct ScriptedSet {
        counts: Mutex<Vec<Option<usize>>>,
    }

    #[async_trait]
    impl UnconfirmedSource for ScriptedSet {
        async fn unconfirmed(&self, _address: &str) -> Result<Vec<UnconfirmedTransaction>, CollaboratorError> {
            let mut counts = self.counts.lock().unwrap();
            let next = if counts.len() > 1 { counts.remove(0) } else { counts[0] };
            match next {
                Some(n) => Ok(vec![UnconfirmedTransaction::default(); n]),
                None => Err(CollaboratorError::NotFound("address".to_owned())),
            }
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify_unconfirmed(None, 0), Observation::Baseline);
        assert_eq!(classify_unconfirmed(None, 5), Observation::Baseline);
        assert_eq!(classify_unconfirmed(Some(2), 3), Observation::Increased);
        assert_eq!(classify_unconfirmed(Some(3), 3), Observation::Unchanged);
        assert_eq!(classify_unconfirmed(Some(3), 1), Observation::Decreased);
    }

    #[test]
    fn test_any_increase_counts_as_payment() {
        // Known limitation: a jump of several unrelated transactions is
        // indistinguishable from the expected single payment.
        assert_eq!(classify_unconfirmed(Some(0), 4), Observation::Increased);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_is_initial() {
        let source = Arc::new(ScriptedSet {
            counts: Mutex::new(vec![None, Some(2), Some(3)]),
        });
        let (tx, mut rx) = controller_event_channel();
        let handle = spawn_address_watch(source, "qrecv".to_owned(), Duration::from_secs(10), 1, tx);

        assert!(matches!(
            rx.recv().await.unwrap(),
            ControllerEvent::UnconfirmedUnavailable { generation: 1, .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            ControllerEvent::UnconfirmedObserved { initial: true, count: 2, .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            ControllerEvent::UnconfirmedObserved { initial: false, count: 3, .. }
        ));
        handle.abort();
    }
}
