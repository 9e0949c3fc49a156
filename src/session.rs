use crate::data::model::{Record, RecordId};
use crate::error::{Result, ReviewError};
use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// Review session state machine
// ---------------------------------------------------------------------------

/// Where a session stands. `Loading` is [`ReviewSession::start`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// `cursor < working_set.len()`.
    Reviewing,
    /// Every record decided. `renumbered` is `None` while the renumber has
    /// not succeeded yet.
    Finished { renumbered: Option<usize> },
}

/// Result of one applied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Another record is up for review.
    Next,
    /// That was the last one; survivors renumbered to `1..=renumbered`.
    Finished { renumbered: usize },
}

/// One pass over a records directory: the ordered working set, the cursor,
/// and the store decisions are applied to.
pub struct ReviewSession<S: RecordStore> {
    store: S,
    working_set: Vec<RecordId>,
    cursor: usize,
    rejected: usize,
    state: SessionState,
}

impl<S: RecordStore> ReviewSession<S> {
    /// Build the working set from the store's candidates.
    pub fn start(store: S) -> Result<Self> {
        let working_set = store.list_candidates()?;
        if working_set.is_empty() {
            return Err(ReviewError::NoCandidates(store.location()));
        }
        log::info!("Review started with {} record(s)", working_set.len());
        Ok(ReviewSession {
            store,
            working_set,
            cursor: 0,
            rejected: 0,
            state: SessionState::Reviewing,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished { .. })
    }

    /// Identifiers not yet finally dispositioned, in review order.
    pub fn working_set(&self) -> &[RecordId] {
        &self.working_set
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Records quarantined during this session.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Identifier under review, `None` once finished.
    pub fn current(&self) -> Option<RecordId> {
        match self.state {
            SessionState::Reviewing => self.working_set.get(self.cursor).copied(),
            SessionState::Finished { .. } => None,
        }
    }

    /// Load the record under review. A read error leaves the session as is.
    pub fn load_current(&self) -> Option<Result<Record>> {
        let id = self.current()?;
        let loaded = self.store.load(id);
        if let Err(e) = &loaded {
            log::warn!("{e}");
        }
        Some(loaded)
    }

    /// Keep the current record and move on.
    pub fn keep(&mut self) -> Result<Step> {
        let id = self.current().ok_or(ReviewError::SessionFinished)?;
        self.cursor += 1;
        log::info!("Kept {id}.csv");
        self.advance()
    }

    /// Quarantine the current record. On failure nothing changes.
    pub fn reject(&mut self) -> Result<Step> {
        let id = self.current().ok_or(ReviewError::SessionFinished)?;
        self.store.quarantine(id)?;
        // The next record shifts into the cursor slot.
        self.working_set.remove(self.cursor);
        self.rejected += 1;
        self.advance()
    }

    /// Re-run a renumber that failed when the session finished.
    pub fn retry_renumber(&mut self) -> Result<usize> {
        match self.state {
            SessionState::Finished { renumbered: None } => self.renumber(),
            SessionState::Finished { renumbered: Some(_) } => Err(ReviewError::SessionFinished),
            SessionState::Reviewing => Err(ReviewError::Renumber(anyhow::anyhow!(
                "{} record(s) still awaiting review",
                self.working_set.len() - self.cursor
            ))),
        }
    }

    fn advance(&mut self) -> Result<Step> {
        if self.cursor < self.working_set.len() {
            return Ok(Step::Next);
        }
        self.state = SessionState::Finished { renumbered: None };
        log::info!(
            "Review complete: {} kept, {} rejected",
            self.working_set.len(),
            self.rejected
        );
        let renumbered = self.renumber()?;
        Ok(Step::Finished { renumbered })
    }

    fn renumber(&mut self) -> Result<usize> {
        match self.store.renumber() {
            Ok(n) => {
                self.state = SessionState::Finished {
                    renumbered: Some(n),
                };
                Ok(n)
            }
            Err(e) => {
                log::error!("{e}");
                Err(e)
            }
        }
    }
}
