//! Host environment signals read by the session clock.

use std::sync::atomic::{AtomicBool, Ordering};

/// The three raw inputs the local focus state is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSignals {
    /// Document-level visibility.
    pub visible: bool,
    /// Window focus.
    pub focused: bool,
    /// Presence element intersects the viewport.
    pub in_viewport: bool,
}

impl HostSignals {
    /// All three inputs hold.
    pub const ACTIVE: Self = Self {
        visible: true,
        focused: true,
        in_viewport: true,
    };

    /// None of the inputs hold.
    pub const HIDDEN: Self = Self {
        visible: false,
        focused: false,
        in_viewport: false,
    };

    /// AND of the three inputs.
    pub fn all_hold(&self) -> bool {
        self.visible && self.focused && self.in_viewport
    }
}

/// Readable host environment, polled as a fallback when focus events do not
/// reach the engine.
pub trait HostEnvironment: Send + Sync + std::fmt::Debug + 'static {
    /// Current values of the three inputs.
    fn signals(&self) -> HostSignals;
}

/// Host whose signals are set explicitly (headless nodes, tests).
#[derive(Debug)]
pub struct ManualHost {
    visible: AtomicBool,
    focused: AtomicBool,
    in_viewport: AtomicBool,
}

impl ManualHost {
    /// Create a host reporting the given signals.
    pub fn new(signals: HostSignals) -> Self {
        Self {
            visible: AtomicBool::new(signals.visible),
            focused: AtomicBool::new(signals.focused),
            in_viewport: AtomicBool::new(signals.in_viewport),
        }
    }

    /// Replace all three signals.
    pub fn set(&self, signals: HostSignals) {
        self.visible.store(signals.visible, Ordering::SeqCst);
        self.focused.store(signals.focused, Ordering::SeqCst);
        self.in_viewport.store(signals.in_viewport, Ordering::SeqCst);
    }
}

impl HostEnvironment for ManualHost {
    fn signals(&self) -> HostSignals {
        HostSignals {
            visible: self.visible.load(Ordering::SeqCst),
            focused: self.focused.load(Ordering::SeqCst),
            in_viewport: self.in_viewport.load(Ordering::SeqCst),
        }
    }
}
