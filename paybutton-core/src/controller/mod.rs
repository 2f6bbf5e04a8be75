//! The payment request controller.
//!
//! [`PaymentController::mount`] arms the pollers the config asks for, picks
//! the initial step (install, login or fresh) and spawns the actor that owns
//! the state machine. The returned [`ControllerHandle`] is the only way in:
//! it forwards clicks, swaps the config and exposes the [`RenderState`]
//! stream the presentational layer draws from.
//!
//! Steps move `Fresh -> Pending -> Complete`, and back to `Fresh` on
//! rejection or, for repeatable requests, after the repeat timeout.
//! `InstallRequired` and `LoginRequired` are entered at mount or on click
//! when the provider or its account is missing. A growing unconfirmed set on
//! a watched address completes the request from any step.

mod actor;
mod payload;
mod render;
mod state;


pub use payload::{build_payload, calculated_value, rendered_amount};
pub use render::RenderState;
pub use state::{ButtonState, Completion, ControllerState};

use crate::collaborators::Collaborators;
use crate::config::{ControllerSettings, PaymentRequestConfig};
use crate::events::{ControllerCommand, ControllerCommandSender, controller_command_channel, controller_event_channel};
use crate::utils::TaskKind;
use actor::ControllerActor;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

/// Errors returned by [`ControllerHandle`].
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller was torn down.
    #[error("payment controller is no longer running")]
    Stopped,

    /// The controller task panicked or was aborted.
    #[error("payment controller task failed: {0}")]
    Join(#[from] JoinError),
}

/// Background work that was still live when the controller unmounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub cancelled: Vec<TaskKind>,
}

impl TeardownReport {
    pub fn was_cancelled(&self, kind: TaskKind) -> bool {
        self.cancelled.contains(&kind)
    }
}

/// A payment request waiting to be mounted.
pub struct PaymentController {
    config: PaymentRequestConfig,
    collaborators: Collaborators,
    settings: ControllerSettings,
}

impl PaymentController {
    pub fn new(config: PaymentRequestConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            settings: ControllerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Start the controller on the current tokio runtime.
    ///
    /// The initial step is already decided when this returns.
    pub fn mount(self) -> ControllerHandle {
        let (events_tx, events_rx) = controller_event_channel();
        let (commands_tx, commands_rx) = controller_command_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut actor = ControllerActor::new(self.config, self.collaborators, self.settings, events_tx);
        actor.mount();
        let render_rx = actor.subscribe();

        let task = tokio::spawn(actor.run(shutdown_rx, commands_rx, events_rx));

        ControllerHandle {
            commands: commands_tx,
            render_rx,
            shutdown_tx,
            task,
        }
    }
}

/// Handle to a mounted controller. Dropping it unmounts the controller.
pub struct ControllerHandle {
    commands: ControllerCommandSender,
    render_rx: watch::Receiver<RenderState>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<TeardownReport>,
}

impl ControllerHandle {
    /// Forward a user click.
    pub async fn click(&self) -> Result<(), ControllerError> {
        self.commands
            .send(ControllerCommand::Click)
            .await
            .map_err(|_| ControllerError::Stopped)
    }

    /// Replace the payment request. Only pollers whose inputs changed are
    /// re-armed. Applied after any click sent before it.
    pub async fn reconfigure(&self, config: PaymentRequestConfig) -> Result<(), ControllerError> {
        self.commands
            .send(ControllerCommand::Reconfigure(Box::new(config)))
            .await
            .map_err(|_| ControllerError::Stopped)
    }

    /// Latest rendered state.
    pub fn render_state(&self) -> RenderState {
        self.render_rx.borrow().clone()
    }

    /// Stream of rendered states.
    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.render_rx.clone()
    }

    /// Cancel every live timer and poll, and wait for the actor to exit.
    pub async fn teardown(self) -> Result<TeardownReport, ControllerError> {
        let _ = self.shutdown_tx.send(true);
        Ok(self.task.await?)
    }
}
