//! Draft-staleness signal polling.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use presence_core::result::AppResult;
use presence_core::traits::DraftSignal;
use presence_core::types::{ActorId, SubjectId};

/// One poll result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPoll {
    /// Every actor with a fresh draft, for the ledger.
    pub drafts: HashSet<ActorId>,
    /// Whether the local actor is among them.
    pub local: bool,
}

/// Polls the draft signal for one subject.
#[derive(Debug, Clone)]
pub struct DraftPoller {
    /// Draft signal source.
    signal: Arc<dyn DraftSignal>,
    /// Subject being watched.
    subject_id: SubjectId,
    /// Local actor.
    local_actor: ActorId,
    /// Drafts older than this no longer count.
    staleness: Duration,
}

impl DraftPoller {
    /// Creates a poller.
    pub fn new(
        signal: Arc<dyn DraftSignal>,
        subject_id: SubjectId,
        local_actor: ActorId,
        staleness: Duration,
    ) -> Self {
        Self {
            signal,
            subject_id,
            local_actor,
            staleness,
        }
    }

    /// Queries the signal once.
    pub async fn poll_once(&self) -> AppResult<DraftPoll> {
        let drafts = self
            .signal
            .fresh_drafts(self.subject_id, self.staleness)
            .await?;
        let local = drafts.contains(&self.local_actor);
        trace!(subject_id = %self.subject_id, count = drafts.len(), local, "Draft signal polled");
        Ok(DraftPoll { drafts, local })
    }
}
