//! Draft-staleness signal.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{ActorId, SubjectId};

/// Reports which actors hold an uncommitted edit on a subject.
///
/// Backed by whatever durably stores drafts; the engine only polls it.
#[async_trait]
pub trait DraftSignal: Send + Sync + std::fmt::Debug + 'static {
    /// Actors whose in-progress draft on `subject` is younger than `staleness`.
    async fn fresh_drafts(
        &self,
        subject: SubjectId,
        staleness: Duration,
    ) -> AppResult<HashSet<ActorId>>;
}

/// Draft signal for hosts that have no draft storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDrafts;

#[async_trait]
impl DraftSignal for NoDrafts {
    async fn fresh_drafts(
        &self,
        _subject: SubjectId,
        _staleness: Duration,
    ) -> AppResult<HashSet<ActorId>> {
        Ok(HashSet::new())
    }
}
