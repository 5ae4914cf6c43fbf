//! Presence channel naming and parsing.

use presence_core::types::SubjectId;

/// Typed presence channel: one per subject of a subject type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresenceChannel {
    /// Subject type, e.g. `document`.
    pub subject_type: String,
    /// Subject instance.
    pub subject_id: SubjectId,
}

impl PresenceChannel {
    /// Creates a channel for a subject.
    pub fn new(subject_type: impl Into<String>, subject_id: SubjectId) -> Self {
        Self {
            subject_type: subject_type.into(),
            subject_id,
        }
    }

    /// Converts back to a channel string.
    pub fn to_channel_string(&self) -> String {
        format!("presence:{}:{}", self.subject_type, self.subject_id)
    }
}
