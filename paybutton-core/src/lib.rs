#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod collaborators;
pub mod config;
pub mod controller;
pub mod conversion;
pub mod events;
pub mod processors;
pub mod utils;

pub use controller::{ButtonState, ControllerError, ControllerHandle, PaymentController, RenderState, TeardownReport};
