//! Edge-triggered focus state machine with a debounced loss transition.

use std::time::Duration;

use tokio::time::Instant;

use presence_core::traits::HostSignals;
use presence_core::types::FocusState;

/// Derives the local focus state from host signals.
///
/// Gaining focus commits immediately. Losing focus only commits once the
/// loss has held for the whole debounce window; a regain inside the window
/// cancels it. Every method returns `Some(state)` exactly when the committed
/// state changes.
#[derive(Debug, Clone)]
pub struct FocusDebouncer {
    /// Delay before a loss commits.
    debounce: Duration,
    /// Last committed state.
    committed: FocusState,
    /// When a pending loss commits.
    pending_loss: Option<Instant>,
}

impl FocusDebouncer {
    /// Creates a debouncer starting in `initial`.
    pub fn new(debounce: Duration, initial: FocusState) -> Self {
        Self {
            debounce,
            committed: initial,
            pending_loss: None,
        }
    }

    /// Creates a debouncer whose initial state is derived from `signals`.
    pub fn from_signals(debounce: Duration, signals: HostSignals) -> Self {
        Self::new(debounce, target(signals))
    }

    /// Last committed state.
    pub fn state(&self) -> FocusState {
        self.committed
    }

    /// Deadline of the pending loss, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_loss
    }

    /// Feeds the current host signals.
    pub fn observe(&mut self, signals: HostSignals, now: Instant) -> Option<FocusState> {
        match (self.committed, target(signals)) {
            (FocusState::Active, FocusState::Active) => {
                self.pending_loss = None;
                None
            }
            (FocusState::Idle, FocusState::Active) => {
                self.pending_loss = None;
                self.commit(FocusState::Active)
            }
            (FocusState::Active, FocusState::Idle) => {
                if self.debounce.is_zero() {
                    return self.commit(FocusState::Idle);
                }
                if self.pending_loss.is_none() {
                    self.pending_loss = Some(now + self.debounce);
                }
                self.fire(now)
            }
            (FocusState::Idle, FocusState::Idle) => None,
        }
    }

    /// Commits a pending loss whose deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<FocusState> {
        match self.pending_loss {
            Some(deadline) if deadline <= now => {
                self.pending_loss = None;
                self.commit(FocusState::Idle)
            }
            _ => None,
        }
    }

    fn commit(&mut self, state: FocusState) -> Option<FocusState> {
        if self.committed == state {
            return None;
        }
        self.committed = state;
        Some(state)
    }
}

fn target(signals: HostSignals) -> FocusState {
    if signals.all_hold() {
        FocusState::Active
    } else {
        FocusState::Idle
    }
}
