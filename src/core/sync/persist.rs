//! Debounced, stale-aware plan persistence
//!
//! The in-memory plan is the authority. Saves are coalesced behind a
//! debounce deadline and every save carries the revision it was taken at,
//! so a save that finishes after newer local edits is reported as stale
//! instead of being treated as the latest state.

use crate::core::catalog::{PlanStore, StoreError};
use crate::core::models::{CompletedRecord, FlowchartPlacement, PlanState, SectionId, Semester};
use crate::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Serializable image of a plan as the store sees it
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSnapshot {
    /// Completion records
    pub completed: Vec<CompletedRecord>,
    /// Semester the schedule belongs to
    pub semester: Option<Semester>,
    /// Scheduled section ids
    pub section_ids: Vec<SectionId>,
    /// Colors of scheduled sections
    pub colors: BTreeMap<SectionId, String>,
    /// Flowchart nodes
    pub flowchart: Vec<FlowchartPlacement>,
}

impl PlanSnapshot {
    /// Capture the persistable parts of `plan`
    #[must_use]
    pub fn capture(plan: &PlanState) -> Self {
        Self {
            completed: plan.completed().cloned().collect(),
            semester: plan.active_semester,
            section_ids: plan.scheduled_sections().map(|s| s.id.clone()).collect(),
            colors: plan
                .scheduled()
                .filter_map(|p| p.color.clone().map(|c| (p.section.id.clone(), c)))
                .collect(),
            flowchart: plan.flowchart().cloned().collect(),
        }
    }

    /// Write the snapshot to a store
    ///
    /// # Errors
    /// Returns the first store error encountered
    pub fn write_to<S: PlanStore + ?Sized>(&self, store: &mut S, user: &str) -> Result<(), StoreError> {
        store.put_completed_courses(user, &self.completed)?;
        if let Some(semester) = &self.semester {
            store.put_schedule(user, semester, &self.section_ids, &self.colors)?;
        }
        store.put_flowchart(user, &self.flowchart)
    }
}

/// A save finished after the plan had already moved on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleWriteConflict {
    /// Revision the finished save was taken at
    pub saved: u64,
    /// Revision of the in-memory plan when it finished
    pub current: u64,
}

impl fmt::Display for StaleWriteConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "saved revision {} but the plan is at revision {}",
            self.saved, self.current
        )
    }
}

/// Work order for one save
#[derive(Debug, Clone)]
pub struct SaveTicket {
    /// Plan revision the snapshot was taken at
    pub revision: u64,
    /// What to write
    pub snapshot: PlanSnapshot,
}

/// Result of finishing a save
#[derive(Debug)]
pub enum SaveOutcome {
    /// The store now matches the in-memory plan
    Committed {
        /// Revision written
        revision: u64,
    },
    /// The write landed but local edits happened meanwhile; another save is queued
    Stale(StaleWriteConflict),
    /// The write failed; it will be retried after the debounce window
    Failed(StoreError),
}

/// Revision-tracking save scheduler driven by caller-supplied instants
#[derive(Debug, Clone)]
pub struct SaveQueue {
    debounce: Duration,
    revision: u64,
    deadline: Option<Instant>,
    in_flight: Option<u64>,
    persisted: Option<PlanSnapshot>,
}

impl SaveQueue {
    /// Create an idle queue
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            revision: 0,
            deadline: None,
            in_flight: None,
            persisted: None,
        }
    }

    /// Record `snapshot` as already stored (e.g., right after loading)
    pub fn mark_persisted(&mut self, snapshot: PlanSnapshot) {
        self.persisted = Some(snapshot);
    }

    /// Note a local edit and push the deadline to `now + debounce`
    pub fn mark_dirty(&mut self, now: Instant) {
        self.revision += 1;
        self.deadline = Some(now + self.debounce);
    }

    /// Current local revision
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a save is waiting for its deadline
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether a save has been handed out and not completed
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a save may start at `now`
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.in_flight.is_none() && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Start a save if one is due
    ///
    /// Returns `None` when nothing is due, a save is in flight, or the plan
    /// matches what was last persisted.
    pub fn begin(&mut self, plan: &PlanState, now: Instant) -> Option<SaveTicket> {
        if !self.is_due(now) {
            return None;
        }
        self.take_ticket(plan)
    }

    /// Start a save immediately, ignoring the debounce deadline
    pub fn begin_now(&mut self, plan: &PlanState) -> Option<SaveTicket> {
        if self.in_flight.is_some() || self.deadline.is_none() {
            return None;
        }
        self.take_ticket(plan)
    }

    fn take_ticket(&mut self, plan: &PlanState) -> Option<SaveTicket> {
        self.deadline = None;
        let snapshot = PlanSnapshot::capture(plan);
        if self.persisted.as_ref() == Some(&snapshot) {
            debug!("Plan at revision {} matches the stored copy, skipping save", self.revision);
            return None;
        }
        self.in_flight = Some(self.revision);
        Some(SaveTicket {
            revision: self.revision,
            snapshot,
        })
    }

    /// Finish a save started with [`SaveQueue::begin`]
    pub fn complete(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), StoreError>,
        now: Instant,
    ) -> SaveOutcome {
        self.in_flight = None;
        match result {
            Err(err) => {
                warn!("Saving plan revision {} failed: {err}", ticket.revision);
                self.deadline = Some(now + self.debounce);
                SaveOutcome::Failed(err)
            }
            Ok(()) => {
                self.persisted = Some(ticket.snapshot);
                if ticket.revision == self.revision {
                    debug!("Plan revision {} saved", ticket.revision);
                    SaveOutcome::Committed {
                        revision: ticket.revision,
                    }
                } else {
                    let conflict = StaleWriteConflict {
                        saved: ticket.revision,
                        current: self.revision,
                    };
                    warn!("Stale plan save: {conflict}; queueing latest state");
                    self.deadline.get_or_insert(now);
                    SaveOutcome::Stale(conflict)
                }
            }
        }
    }
}
