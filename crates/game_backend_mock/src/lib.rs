//! Deterministic in-memory implementation of the shared `game_backend`
//! contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing. It emulates the
//! server's observable behavior: round-gated investigation visibility,
//! case-insensitive answer checking, round advancement once a round is fully
//! solved, and one-shot final report acceptance.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use game_backend::{
    BackendError, GameBackend, InvestigationId, InvestigationRecord, QueryOutcome, SchemaMap,
    StateSnapshot, VerifyOutcome, VerifyRequest,
};

/// Round after which solving everything no longer advances the player.
const FINAL_ROUND: u32 = 2;

#[derive(Debug, Clone)]
struct ScriptedInvestigation {
    id: InvestigationId,
    prompt: String,
    round: u32,
    answer: String,
}

#[derive(Debug, Default)]
struct MockState {
    player_name: String,
    remaining_time: f64,
    round: u32,
    investigations: Vec<ScriptedInvestigation>,
    solved: BTreeSet<InvestigationId>,
    schema: SchemaMap,
    query_outcomes: VecDeque<QueryOutcome>,
    final_reports: Vec<String>,
    state_failures: VecDeque<BackendError>,
    investigation_failures: VecDeque<BackendError>,
    verify_failures: VecDeque<BackendError>,
    report_failures: VecDeque<BackendError>,
    state_fetches: usize,
    investigation_fetches: usize,
    verify_calls: Vec<VerifyRequest>,
}

/// Scripted game server used by `caseterm` tests and local runs.
#[derive(Debug)]
pub struct MockGameBackend {
    state: Mutex<MockState>,
}

impl MockGameBackend {
    /// Creates a mock server for one player with a seeded countdown.
    #[must_use]
    pub fn new(player_name: impl Into<String>, remaining_time: f64) -> Self {
        Self {
            state: Mutex::new(MockState {
                player_name: player_name.into(),
                remaining_time,
                round: 1,
                ..MockState::default()
            }),
        }
    }

    /// Adds one investigation visible in `round` with its expected answer.
    #[must_use]
    pub fn with_investigation(
        self,
        round: u32,
        id: InvestigationId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        lock_unpoisoned(&self.state)
            .investigations
            .push(ScriptedInvestigation {
                id,
                prompt: prompt.into(),
                round,
                answer: answer.into(),
            });
        self
    }

    /// Sets the current round directly (e.g. to start a test in round 2).
    #[must_use]
    pub fn with_round(self, round: u32) -> Self {
        lock_unpoisoned(&self.state).round = round;
        self
    }

    /// Sets the visible table schema.
    #[must_use]
    pub fn with_schema(self, schema: SchemaMap) -> Self {
        lock_unpoisoned(&self.state).schema = schema;
        self
    }

    /// Queues the outcome returned by the next `run_query` call.
    pub fn push_query_outcome(&self, outcome: QueryOutcome) {
        lock_unpoisoned(&self.state).query_outcomes.push_back(outcome);
    }

    /// Queues a failure for the next `fetch_state` call.
    pub fn fail_next_state_fetch(&self, error: BackendError) {
        lock_unpoisoned(&self.state).state_failures.push_back(error);
    }

    /// Queues a failure for the next `fetch_investigations` call.
    pub fn fail_next_investigation_fetch(&self, error: BackendError) {
        lock_unpoisoned(&self.state)
            .investigation_failures
            .push_back(error);
    }

    /// Queues a failure for the next `verify` call.
    pub fn fail_next_verify(&self, error: BackendError) {
        lock_unpoisoned(&self.state).verify_failures.push_back(error);
    }

    /// Queues a failure for the next `submit_final_report` call.
    pub fn fail_next_report(&self, error: BackendError) {
        lock_unpoisoned(&self.state).report_failures.push_back(error);
    }

    /// Returns every verify request received, in order.
    #[must_use]
    pub fn verify_calls(&self) -> Vec<VerifyRequest> {
        lock_unpoisoned(&self.state).verify_calls.clone()
    }

    /// Returns every final report received, in order.
    #[must_use]
    pub fn final_reports(&self) -> Vec<String> {
        lock_unpoisoned(&self.state).final_reports.clone()
    }

    #[must_use]
    pub fn state_fetches(&self) -> usize {
        lock_unpoisoned(&self.state).state_fetches
    }

    #[must_use]
    pub fn investigation_fetches(&self) -> usize {
        lock_unpoisoned(&self.state).investigation_fetches
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        lock_unpoisoned(&self.state).round
    }
}

#[async_trait]
impl GameBackend for MockGameBackend {
    async fn fetch_state(&self) -> Result<StateSnapshot, BackendError> {
        let mut state = lock_unpoisoned(&self.state);
        state.state_fetches += 1;
        if let Some(error) = state.state_failures.pop_front() {
            return Err(error);
        }

        Ok(StateSnapshot {
            name: state.player_name.clone(),
            remaining_time: state.remaining_time,
            round: state.round,
        })
    }

    async fn fetch_investigations(&self) -> Result<Vec<InvestigationRecord>, BackendError> {
        let mut state = lock_unpoisoned(&self.state);
        state.investigation_fetches += 1;
        if let Some(error) = state.investigation_failures.pop_front() {
            return Err(error);
        }

        let round = state.round;
        Ok(state
            .investigations
            .iter()
            .filter(|inv| inv.round == round)
            .map(|inv| InvestigationRecord {
                id: inv.id,
                prompt: inv.prompt.clone(),
                solved: state.solved.contains(&inv.id),
            })
            .collect())
    }

    async fn fetch_schema(&self) -> Result<SchemaMap, BackendError> {
        Ok(lock_unpoisoned(&self.state).schema.clone())
    }

    async fn verify(&self, request: VerifyRequest) -> Result<VerifyOutcome, BackendError> {
        let mut state = lock_unpoisoned(&self.state);
        state.verify_calls.push(request.clone());
        if let Some(error) = state.verify_failures.pop_front() {
            return Err(error);
        }

        let Some(expected) = state
            .investigations
            .iter()
            .find(|inv| inv.id == request.id)
            .map(|inv| inv.answer.clone())
        else {
            return Err(BackendError::status("/api/verify", 400, "Invalid ID"));
        };

        let correct = expected.eq_ignore_ascii_case(request.answer.trim());
        if correct {
            state.solved.insert(request.id);

            let round = state.round;
            let round_cleared = state
                .investigations
                .iter()
                .filter(|inv| inv.round == round)
                .all(|inv| state.solved.contains(&inv.id));
            if round_cleared && state.round < FINAL_ROUND {
                state.round += 1;
            }
        }

        Ok(VerifyOutcome { correct })
    }

    async fn run_query(&self, _sql: &str) -> Result<QueryOutcome, BackendError> {
        let mut state = lock_unpoisoned(&self.state);
        Ok(state.query_outcomes.pop_front().unwrap_or(QueryOutcome::Rows {
            columns: Vec::new(),
            rows: Vec::new(),
        }))
    }

    async fn submit_final_report(&self, answer: &str) -> Result<(), BackendError> {
        let mut state = lock_unpoisoned(&self.state);
        if let Some(error) = state.report_failures.pop_front() {
            return Err(error);
        }
        if !state.final_reports.is_empty() {
            return Err(BackendError::status("/submit", 400, "Already submitted"));
        }

        state.final_reports.push(answer.to_string());
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
