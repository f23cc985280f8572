//! Investigation set and round-gated progression state.
//!
//! The tracker mirrors the server's visible investigation set wholesale; the
//! server is the sole source of truth for solved status and visibility. Local
//! state is limited to the staged final answer, the in-flight verify guard,
//! and the deferred all-solved refresh bookkeeping.

use std::collections::BTreeSet;

use game_backend::{InvestigationId, InvestigationRecord};

use crate::error::GameError;

/// Investigation id the server designates for the final report channel.
pub const DEFAULT_FINAL_GATE_ID: InvestigationId = 2;

/// Routing tag for an investigation's answer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestigationKind {
    /// Answer goes through the per-item verify flow.
    Regular,
    /// Answer is staged locally and delivered via the final report.
    FinalGate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Investigation {
    pub id: InvestigationId,
    pub prompt: String,
    pub solved: bool,
    pub kind: InvestigationKind,
}

impl Investigation {
    /// True when the presentation layer should render an answer input.
    #[must_use]
    pub fn accepting_input(&self) -> bool {
        !self.solved
    }

    #[must_use]
    pub fn is_final_gate(&self) -> bool {
        self.kind == InvestigationKind::FinalGate
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    final_gate_id: InvestigationId,
    items: Vec<Investigation>,
    staged_final: Option<String>,
    refresh_pending: bool,
    observed_all_solved: bool,
    in_flight: BTreeSet<InvestigationId>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(final_gate_id: InvestigationId) -> Self {
        Self {
            final_gate_id,
            items: Vec::new(),
            staged_final: None,
            refresh_pending: false,
            observed_all_solved: false,
            in_flight: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn final_gate_id(&self) -> InvestigationId {
        self.final_gate_id
    }

    #[must_use]
    pub fn items(&self) -> &[Investigation] {
        &self.items
    }

    /// Replaces the visible set wholesale, preserving server order and tagging
    /// the designated final-gate item.
    pub fn replace_items(&mut self, records: Vec<InvestigationRecord>) {
        self.items = records
            .into_iter()
            .map(|record| Investigation {
                kind: if record.id == self.final_gate_id {
                    InvestigationKind::FinalGate
                } else {
                    InvestigationKind::Regular
                },
                id: record.id,
                prompt: record.prompt,
                solved: record.solved,
            })
            .collect();
    }

    /// Derived each render; an empty visible set counts as solved.
    #[must_use]
    pub fn all_visible_solved(&self) -> bool {
        self.items.iter().all(|item| item.solved)
    }

    /// Arms the deferred all-solved refresh when the visible set has just
    /// transitioned to fully solved.
    ///
    /// Edge-triggered with an at-most-one-outstanding guarantee: repeat
    /// detections while a refresh is pending, and re-detections of an
    /// unchanged fully solved set, schedule nothing.
    pub fn schedule_refresh_if_all_solved(&mut self) -> bool {
        let all_solved = self.all_visible_solved();
        let newly_solved = all_solved && !self.observed_all_solved;
        self.observed_all_solved = all_solved;

        if newly_solved && !self.refresh_pending {
            self.refresh_pending = true;
            return true;
        }
        false
    }

    /// Consumes the pending-refresh flag; returns false when no refresh was
    /// armed (the deferred callback should then do nothing).
    pub fn begin_deferred_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }

    #[must_use]
    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Stages the final-gate answer locally; whitespace-only input clears the
    /// staging instead.
    pub fn stage_final_answer(&mut self, value: &str) {
        let trimmed = value.trim();
        self.staged_final = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    #[must_use]
    pub fn staged_final_answer(&self) -> Option<&str> {
        self.staged_final.as_deref()
    }

    /// Marks a verify request in flight for `id`; a second concurrent call for
    /// the same id is rejected rather than queued.
    pub fn begin_submission(&mut self, id: InvestigationId) -> Result<(), GameError> {
        if !self.in_flight.insert(id) {
            return Err(GameError::SubmissionInFlight { id });
        }
        Ok(())
    }

    pub fn finish_submission(&mut self, id: InvestigationId) {
        self.in_flight.remove(&id);
    }
}
