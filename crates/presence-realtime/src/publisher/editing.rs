//! Local editing state from its two external sources.

use presence_core::types::EditingState;

/// The two inputs the local editing state is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditingSignals {
    /// The host reported that the user entered edit mode.
    pub edit_mode: bool,
    /// The draft signal reports a fresh draft by the local actor.
    pub fresh_draft: bool,
}

impl EditingSignals {
    /// Either source is enough to assert editing.
    pub fn state(&self) -> EditingState {
        EditingState::from_flag(self.edit_mode || self.fresh_draft)
    }
}
