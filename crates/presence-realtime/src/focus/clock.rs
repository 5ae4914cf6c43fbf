//! Session clock task: turns host events and periodic polls into the local
//! focus state.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use presence_core::config::focus::FocusConfig;
use presence_core::traits::{HostEnvironment, HostSignals};
use presence_core::types::FocusState;

use super::debouncer::FocusDebouncer;

/// A change of one host input, pushed by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Document visibility changed.
    Visibility(bool),
    /// Window focus changed.
    Focus(bool),
    /// Presence element entered or left the viewport.
    Viewport(bool),
}

impl HostEvent {
    /// Applies the change to a set of signals.
    pub fn apply(self, signals: &mut HostSignals) {
        match self {
            Self::Visibility(v) => signals.visible = v,
            Self::Focus(v) => signals.focused = v,
            Self::Viewport(v) => signals.in_viewport = v,
        }
    }
}

/// Derives and publishes the local focus state.
///
/// Observers read the state from the [`watch::Receiver`] returned by
/// [`SessionClock::new`]; it is only written when the state changes.
#[derive(Debug)]
pub struct SessionClock {
    /// Readable host inputs, polled as a fallback.
    host: Arc<dyn HostEnvironment>,
    /// Latest known inputs.
    signals: HostSignals,
    /// Edge logic.
    debouncer: FocusDebouncer,
    /// Fallback poll interval.
    poll_interval: std::time::Duration,
    /// Committed state.
    state_tx: watch::Sender<FocusState>,
    /// Latest inputs, for observers that need more than the focus state.
    signals_tx: watch::Sender<HostSignals>,
}

impl SessionClock {
    /// Creates a clock seeded from the host's current signals.
    pub fn new(
        host: Arc<dyn HostEnvironment>,
        config: &FocusConfig,
    ) -> (Self, watch::Receiver<FocusState>) {
        let signals = host.signals();
        let debouncer = FocusDebouncer::from_signals(config.debounce(), signals);
        let (state_tx, state_rx) = watch::channel(debouncer.state());
        let (signals_tx, _) = watch::channel(signals);

        let clock = Self {
            host,
            signals,
            debouncer,
            poll_interval: config.poll_interval(),
            state_tx,
            signals_tx,
        };
        (clock, state_rx)
    }

    /// Current committed state.
    pub fn state(&self) -> FocusState {
        self.debouncer.state()
    }

    /// Receiver of the raw host inputs as last seen by the clock.
    pub fn subscribe_signals(&self) -> watch::Receiver<HostSignals> {
        self.signals_tx.subscribe()
    }

    /// Runs until `cancel` fires.
    ///
    /// Events update the known inputs immediately. The poll replaces them
    /// with what the host environment reports. A closed event channel leaves
    /// the poll running alone.
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>, cancel: CancellationToken) {
        let mut poll = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        info!(state = self.state().as_str(), "Session clock started");

        loop {
            let deadline = self.debouncer.deadline();

            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        event.apply(&mut self.signals);
                        self.observe();
                    }
                    None => events_open = false,
                },
                _ = poll.tick() => {
                    self.signals = self.host.signals();
                    self.observe();
                }
                _ = sleep_until(deadline) => {
                    let transition = self.debouncer.fire(Instant::now());
                    self.commit(transition);
                }
            }
        }

        debug!("Session clock stopped");
    }

    fn observe(&mut self) {
        let signals = self.signals;
        self.signals_tx.send_if_modified(|current| {
            if *current == signals {
                return false;
            }
            *current = signals;
            true
        });
        let transition = self.debouncer.observe(signals, Instant::now());
        self.commit(transition);
    }

    fn commit(&self, transition: Option<FocusState>) {
        let Some(state) = transition else {
            return;
        };
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        debug!(state = state.as_str(), "Local focus changed");
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
