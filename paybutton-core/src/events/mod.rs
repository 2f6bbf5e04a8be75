//! Events flowing into the controller actor.
//!
//! # Event Flow
//!
//! 1. The host calls [`ControllerHandle`] methods, which send
//!    [`ControllerCommand`]s (clicks and config replacements, in order).
//! 2. Pollers spawned by the controller (price refresh, metadata fetch,
//!    login poll, address watch, repeat timeout, transaction submission)
//!    report back with [`ControllerEvent`]s.
//! 3. The actor applies each message to its state one at a time and
//!    republishes the rendered state.
//!
//! Results from pollers that were re-armed since carry an outdated
//! generation and are dropped.
//!
//! [`ControllerHandle`]: crate::controller::ControllerHandle

pub mod channels;
pub mod types;

pub use channels::{
    ControllerCommandReceiver, ControllerCommandSender, ControllerEventReceiver,
    ControllerEventSender, DEFAULT_CHANNEL_BUFFER, controller_command_channel,
    controller_event_channel,
};

pub use types::{ControllerCommand, ControllerEvent, Generation};
