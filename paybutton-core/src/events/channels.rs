//! Channel factories for controller messages.

use super::types::{ControllerCommand, ControllerEvent};
use tokio::sync::mpsc;

/// Buffer size for controller channels.
///
/// Pollers tick at most a few times a second, so this only fills up if the
/// actor is stalled.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

pub type ControllerEventSender = mpsc::Sender<ControllerEvent>;
pub type ControllerEventReceiver = mpsc::Receiver<ControllerEvent>;

pub type ControllerCommandSender = mpsc::Sender<ControllerCommand>;
pub type ControllerCommandReceiver = mpsc::Receiver<ControllerCommand>;

/// Channel pollers use to report back to the actor.
pub fn controller_event_channel() -> (ControllerEventSender, ControllerEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Channel the handle uses to drive the actor.
pub fn controller_command_channel() -> (ControllerCommandSender, ControllerCommandReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
