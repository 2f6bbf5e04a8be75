//! Background pollers driven by the payment controller.
//!
//! - `session_watcher`: detects the wallet provider and polls for an account
//! - `price_poller`: refreshes the fiat conversion and resolves coin metadata
//! - `address_watcher`: polls the destination's unconfirmed set
//!
//! Each `spawn_*` function returns the task's `JoinHandle`; the controller
//! registers it in its [`TimerRegistry`](crate::utils::TimerRegistry) and the
//! task reports back over the controller's event channel.

pub mod address_watcher;
pub mod price_poller;
pub mod session_watcher;

pub use address_watcher::{Observation, classify_unconfirmed, spawn_address_watch};
pub use price_poller::{MetadataError, MetadataPlan, plan_coin_metadata, spawn_metadata_fetch, spawn_price_refresh};
pub use session_watcher::{Session, detect_provider, detect_session, spawn_account_poll};
