//! The controller actor.
//!
//! One task owns [`ControllerState`] and handles commands, poller events and
//! config changes one at a time, so no two updates interleave. Pollers are
//! separate tasks registered in a [`TimerRegistry`]; they never touch the
//! state directly.

use super::TeardownReport;
use super::payload::{build_payload, calculated_value};
use super::render::RenderState;
use super::state::{ButtonState, Completion, ControllerState};
use crate::collaborators::{Collaborators, ProviderHandle, TransactionRejected};
use crate::config::{ControllerSettings, PaymentRequestConfig};
use crate::events::{
    ControllerCommand, ControllerCommandReceiver, ControllerEvent, ControllerEventReceiver,
    ControllerEventSender, Generation,
};
use crate::processors::{
    MetadataError, MetadataPlan, Observation, Session, detect_session, plan_coin_metadata,
    spawn_account_poll, spawn_address_watch, spawn_metadata_fetch, spawn_price_refresh,
};
use crate::utils::{DebounceAction, Debouncer, TaskKind, TimerRegistry};
use paybutton_sdk::objects::TxReceipt;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Arming counters, one per poller whose results can go stale.
#[derive(Debug, Default)]
struct Generations {
    price: Generation,
    metadata: Generation,
    watch: Generation,
    repeat: Generation,
    submission: Generation,
}

fn bump(generation: &mut Generation) -> Generation {
    *generation = generation.wrapping_add(1);
    *generation
}

pub(super) struct ControllerActor {
    config: PaymentRequestConfig,
    state: ControllerState,
    collaborators: Collaborators,
    settings: ControllerSettings,
    timers: TimerRegistry,
    /// Provider calls still awaiting a result. Several can be live after a
    /// repeat reset; none is aborted before teardown.
    submissions: Vec<(Generation, JoinHandle<()>)>,
    /// The submission the `Pending` step is waiting on.
    pending_submission: Option<Generation>,
    price_debounce: Debouncer,
    generations: Generations,
    events_tx: ControllerEventSender,
    render_tx: watch::Sender<RenderState>,
}

impl ControllerActor {
    pub(super) fn new(
        config: PaymentRequestConfig,
        collaborators: Collaborators,
        settings: ControllerSettings,
        events_tx: ControllerEventSender,
    ) -> Self {
        let state = ControllerState::new();
        let (render_tx, _) = watch::channel(RenderState::compute(&config, &state));
        Self {
            price_debounce: Debouncer::new(settings.price_debounce_window),
            config,
            state,
            collaborators,
            settings,
            timers: TimerRegistry::new(),
            submissions: Vec::new(),
            pending_submission: None,
            generations: Generations::default(),
            events_tx,
            render_tx,
        }
    }

    pub(super) fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.render_tx.subscribe()
    }

    /// Arm the pollers the config asks for and pick the initial step.
    pub(super) fn mount(&mut self) {
        if self.config.watch_address {
            self.arm_address_watch();
        }
        if self.config.price.is_some() {
            self.schedule_price_refresh();
        }
        self.setup_coin_meta();

        match detect_session(self.collaborators.locator.as_ref()) {
            Session::ProviderAbsent => self.enter_install(),
            Session::AccountAbsent(_) => self.enter_login(),
            Session::Ready { account, .. } => debug!(%account, "Provider ready at mount"),
        }

        info!(
            destination = %self.config.destination,
            coin_type = ?self.config.coin_type,
            step = %self.state.step(),
            "Payment controller mounted"
        );
        self.publish();
    }

    pub(super) async fn run(
        mut self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut commands_rx: ControllerCommandReceiver,
        mut events_rx: ControllerEventReceiver,
    ) -> TeardownReport {
        loop {
            tokio::select! {
                biased;

                // A dropped handle unmounts too.
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Payment controller received teardown signal");
                        break;
                    }
                }

                Some(command) = commands_rx.recv() => {
                    self.handle_command(command);
                }

                Some(event) = events_rx.recv() => {
                    debug!(event = event.kind(), "Handling controller event");
                    self.handle_event(event);
                }

                else => {
                    info!("Controller channels closed");
                    break;
                }
            }
            self.publish();
        }

        let mut cancelled = self.timers.disarm_all();
        if self.abort_submissions() {
            cancelled.push(TaskKind::Transaction);
        }
        info!(cancelled = cancelled.len(), "Payment controller unmounted");
        TeardownReport { cancelled }
    }

    fn publish(&self) {
        let next = RenderState::compute(&self.config, &self.state);
        self.render_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    // -- Commands -----------------------------------------------------------

    fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Click => self.click(),
            ControllerCommand::Reconfigure(config) => self.reconfigure(*config),
        }
    }

    fn click(&mut self) {
        let step = self.state.step();
        if !step.accepts_click() {
            debug!(%step, "Click ignored");
            return;
        }
        if !self.state.amount_resolved(&self.config) {
            debug!("Click ignored, amount not resolved yet");
            return;
        }

        match detect_session(self.collaborators.locator.as_ref()) {
            Session::ProviderAbsent => self.enter_install(),
            Session::AccountAbsent(_) => self.enter_login(),
            Session::Ready { provider, account } => self.submit(provider, account),
        }
    }

    fn submit(&mut self, provider: ProviderHandle, account: String) {
        let Some(value) = calculated_value(&self.config, self.state.satoshis()) else {
            warn!(amount = ?self.config.amount, "Amount cannot be expressed in smallest units");
            return;
        };
        if !self.state.begin_payment() {
            return;
        }
        self.timers.disarm(TaskKind::LoginPoll);

        let payload = build_payload(&self.config, &account, value);
        info!(
            to = %payload.to,
            from = %payload.from,
            %value,
            token = payload.send_token_data.is_some(),
            op_return = payload.op_return.is_some(),
            "Submitting transaction to provider"
        );

        let submission = bump(&mut self.generations.submission);
        let events = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let result = provider.send_transaction(payload).await;
            let event = ControllerEvent::TransactionSettled { submission, result };
            if let Err(e) = events.send(event).await {
                warn!(submission, error = %e, "Failed to report transaction outcome, controller gone");
            }
        });
        self.submissions.retain(|(_, handle)| !handle.is_finished());
        self.submissions.push((submission, handle));
        self.pending_submission = Some(submission);
    }

    /// Abort every provider call still in flight. Returns whether any was.
    fn abort_submissions(&mut self) -> bool {
        let mut live = false;
        for (_, handle) in self.submissions.drain(..) {
            live |= !handle.is_finished();
            handle.abort();
        }
        live
    }

    // -- Poller events ------------------------------------------------------

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::PriceComputed { generation, result } => {
                if generation != self.generations.price {
                    debug!(generation, "Dropping stale price result");
                    return;
                }
                match result {
                    Ok(satoshis) => {
                        debug!(satoshis, "Satoshis updated");
                        self.state.set_satoshis(satoshis);
                    }
                    Err(e) => warn!(error = %e, "Price refresh failed, keeping previous amount"),
                }
            }
            ControllerEvent::PriceRefreshDue => {
                self.timers.disarm(TaskKind::PriceDebounce);
                if self.price_debounce.expire(Instant::now()) {
                    if let Some(price) = self.config.price {
                        self.arm_price_refresh(price);
                    }
                }
            }
            ControllerEvent::MetadataResolved {
                generation,
                token_id,
                result,
            } => {
                if generation != self.generations.metadata {
                    debug!(%token_id, "Dropping stale token metadata");
                    return;
                }
                match result {
                    Ok(info) => {
                        info!(%token_id, symbol = %info.symbol, decimals = info.decimals, "Token metadata resolved");
                        self.state.set_coin_meta(info.into());
                    }
                    Err(e) => {
                        let error = MetadataError::Unavailable {
                            token_id,
                            reason: e.to_string(),
                        };
                        warn!(error = %error, "Token metadata lookup failed");
                        self.state.push_error(error);
                    }
                }
            }
            ControllerEvent::AccountDetected { account } => {
                self.timers.disarm(TaskKind::LoginPoll);
                if self.state.login_resolved() {
                    info!(%account, "Login detected");
                }
            }
            ControllerEvent::UnconfirmedObserved {
                generation,
                initial,
                count,
            } => {
                if generation != self.generations.watch {
                    debug!(generation, "Dropping stale unconfirmed count");
                    return;
                }
                match self.state.observe_unconfirmed(initial, count) {
                    Observation::Increased => {
                        info!(count, "Unconfirmed set grew, treating as payment");
                        self.complete_payment(Completion::Watcher, None);
                    }
                    observation => debug!(count, ?observation, "Unconfirmed set polled"),
                }
            }
            ControllerEvent::UnconfirmedUnavailable { generation, error } => {
                if generation == self.generations.watch {
                    warn!(error = %error, "Unconfirmed lookup failed, keeping baseline");
                }
            }
            ControllerEvent::TransactionSettled { submission, result } => {
                self.submissions.retain(|(id, _)| *id != submission);
                self.settle(submission, result);
            }
            ControllerEvent::RepeatElapsed { generation } => {
                if generation != self.generations.repeat {
                    return;
                }
                self.timers.disarm(TaskKind::RepeatTimeout);
                if self.state.repeat_elapsed() {
                    info!("Repeat timeout elapsed, ready for another payment");
                } else {
                    debug!(step = %self.state.step(), "Repeat timeout outside complete, ignored");
                }
            }
        }
    }

    /// Every provider outcome reaches the callbacks. Only the one the
    /// `Pending` step waits on moves the state machine.
    fn settle(&mut self, submission: Generation, result: Result<TxReceipt, TransactionRejected>) {
        let awaited = self.pending_submission == Some(submission);
        if awaited {
            self.pending_submission = None;
        }
        let step = self.state.step();
        let drives_state = awaited && step == ButtonState::Pending;

        match result {
            Ok(receipt) if drives_state => {
                info!(txid = %receipt.txid, "Provider reported success");
                self.complete_payment(Completion::Provider, Some(receipt));
            }
            Ok(receipt) => {
                info!(txid = %receipt.txid, %step, submission, "Provider reported success after the request settled");
                self.collaborators.callbacks.on_success(Some(&receipt));
            }
            Err(rejected) if drives_state => {
                info!(reason = %rejected.reason, "Provider rejected transaction");
                self.state.payment_rejected();
                self.collaborators.callbacks.on_failure(&rejected);
            }
            Err(rejected) => {
                info!(reason = %rejected.reason, %step, submission, "Provider rejected transaction after the request settled");
                self.collaborators.callbacks.on_failure(&rejected);
            }
        }
    }

    fn complete_payment(&mut self, via: Completion, receipt: Option<TxReceipt>) {
        if !self.state.payment_completed(via) {
            return;
        }
        self.collaborators.callbacks.on_success(receipt.as_ref());
        if self.config.is_repeatable {
            self.arm_repeat_timer();
        } else {
            self.disarm_address_watch();
        }
    }

    // -- Reconfiguration ----------------------------------------------------

    fn reconfigure(&mut self, config: PaymentRequestConfig) {
        let previous = std::mem::replace(&mut self.config, config);
        if previous == self.config {
            return;
        }
        info!("Payment request reconfigured");

        if previous.price_target_changed(&self.config) {
            self.state.clear_satoshis();
            self.schedule_price_refresh();
        }
        if self.config.is_repeatable
            && !previous.is_repeatable
            && self.state.step() == ButtonState::Complete
        {
            self.arm_repeat_timer();
        }
        if previous.token_changed(&self.config) {
            self.setup_coin_meta();
        }
        if previous.watch_changed(&self.config) {
            if self.config.watch_address {
                self.arm_address_watch();
            } else {
                self.disarm_address_watch();
            }
        }
    }

    // -- Step side effects --------------------------------------------------

    fn enter_install(&mut self) {
        self.state.require_install();
        self.timers.disarm(TaskKind::LoginPoll);
        info!(url = %self.settings.install_url, "No wallet provider, opening install page");
        self.collaborators.host.open_url(&self.settings.install_url);
    }

    fn enter_login(&mut self) {
        self.state.require_login();
        info!("Wallet provider has no account, waiting for login");
        let handle = spawn_account_poll(
            self.collaborators.locator.clone(),
            self.settings.login_poll_interval,
            self.events_tx.clone(),
        );
        self.timers.arm(TaskKind::LoginPoll, handle);
    }

    // -- Pollers ------------------------------------------------------------

    /// Restart the price poller, debounced.
    fn schedule_price_refresh(&mut self) {
        self.timers.disarm(TaskKind::PriceRefresh);
        bump(&mut self.generations.price);

        let Some(price) = self.config.price else {
            self.timers.disarm(TaskKind::PriceDebounce);
            self.price_debounce.reset();
            return;
        };

        match self.price_debounce.request(Instant::now()) {
            DebounceAction::Fire => self.arm_price_refresh(price),
            DebounceAction::Defer(deadline) => {
                debug!("Price refresh coalesced into trailing run");
                let events = self.events_tx.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    if let Err(e) = events.send(ControllerEvent::PriceRefreshDue).await {
                        warn!(error = %e, "Failed to report debounce deadline, controller gone");
                    }
                });
                self.timers.arm(TaskKind::PriceDebounce, handle);
            }
        }
    }

    fn arm_price_refresh(&mut self, price: Decimal) {
        let generation = bump(&mut self.generations.price);
        let handle = spawn_price_refresh(
            self.collaborators.price_feed.clone(),
            self.config.currency.clone(),
            price,
            self.settings.price_refresh_interval,
            generation,
            self.events_tx.clone(),
        );
        self.timers.arm(TaskKind::PriceRefresh, handle);
    }

    fn setup_coin_meta(&mut self) {
        self.timers.disarm(TaskKind::MetadataFetch);
        let generation = bump(&mut self.generations.metadata);

        match plan_coin_metadata(self.config.coin_type, self.config.token_id.as_deref()) {
            MetadataPlan::Static(meta) => self.state.set_coin_meta(meta),
            MetadataPlan::Fetch(token_id) => {
                self.state.clear_coin_meta();
                let handle = spawn_metadata_fetch(
                    self.collaborators.token_metadata.clone(),
                    token_id,
                    generation,
                    self.events_tx.clone(),
                );
                self.timers.arm(TaskKind::MetadataFetch, handle);
            }
            MetadataPlan::Missing(error) => {
                self.state.clear_coin_meta();
                warn!(error = %error, "Cannot resolve coin metadata");
                self.state.push_error(error);
            }
        }
    }

    fn arm_address_watch(&mut self) {
        let generation = bump(&mut self.generations.watch);
        self.state.clear_unconfirmed();
        info!(address = %self.config.destination, "Watching address for payments");
        let handle = spawn_address_watch(
            self.collaborators.unconfirmed.clone(),
            self.config.destination.clone(),
            self.settings.address_watch_interval,
            generation,
            self.events_tx.clone(),
        );
        self.timers.arm(TaskKind::AddressWatch, handle);
    }

    fn disarm_address_watch(&mut self) {
        bump(&mut self.generations.watch);
        if self.timers.disarm(TaskKind::AddressWatch) {
            info!(address = %self.config.destination, "Stopped watching address");
        }
    }

    fn arm_repeat_timer(&mut self) {
        let generation = bump(&mut self.generations.repeat);
        let timeout = self.config.repeat_timeout();
        let events = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Err(e) = events.send(ControllerEvent::RepeatElapsed { generation }).await {
                warn!(generation, error = %e, "Failed to report repeat timeout, controller gone");
            }
        });
        self.timers.arm(TaskKind::RepeatTimeout, handle);
    }
}
