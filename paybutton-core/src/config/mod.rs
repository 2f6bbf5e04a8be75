//! Configuration types for the payment controller.
//!
//! [`PaymentRequestConfig`] is what the host page passes in (and may change
//! while the controller is mounted); [`ControllerSettings`] holds the poll
//! intervals and other knobs that stay fixed for the controller's lifetime.

mod payment;
mod settings;

pub use payment::PaymentRequestConfig;
pub use settings::ControllerSettings;
