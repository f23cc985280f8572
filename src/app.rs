//! The session-state orchestrator.
//!
//! [`GameApp`] owns the three stateful pieces of the page — the terminal tab
//! registry, the investigation progression tracker, and the countdown clock —
//! plus the remote sync facade that reconciles them with the server. All
//! render-ready state is exposed through synchronous getters (pull, not
//! push); the embedding presentation layer drives the app from its event
//! handlers and calls [`GameApp::heartbeat`] once per second.

use std::sync::Arc;
use std::time::Duration;

use game_backend::{GameBackend, InvestigationId, QueryOutcome, SchemaMap, VerifyRequest};
use game_backend_http::{GameApiConfig, HttpGameBackend};
use tokio::time::Instant;

use crate::clock::{CountdownClock, TickOutcome};
use crate::error::GameError;
use crate::investigations::{Investigation, ProgressTracker, DEFAULT_FINAL_GATE_ID};
use crate::ports::{ConfirmPrompt, EditorSurface, NavigationTarget, Navigator};
use crate::sessions::SessionStore;
use crate::sync::RemoteSync;

/// Delay between an all-solved detection and its deferred re-fetch.
const DEFERRED_REFRESH_DELAY: Duration = Duration::from_secs(1);

pub struct GameApp {
    backend: Arc<dyn GameBackend>,
    store: SessionStore,
    tracker: ProgressTracker,
    clock: CountdownClock,
    sync: RemoteSync,
    schema: SchemaMap,
    deferred_refresh_at: Option<Instant>,
    last_fetch_error: Option<String>,
}

impl GameApp {
    #[must_use]
    pub fn new(backend: Arc<dyn GameBackend>) -> Self {
        Self::with_final_gate(backend, DEFAULT_FINAL_GATE_ID)
    }

    #[must_use]
    pub fn with_final_gate(backend: Arc<dyn GameBackend>, final_gate_id: InvestigationId) -> Self {
        Self {
            backend,
            store: SessionStore::new(),
            tracker: ProgressTracker::new(final_gate_id),
            clock: CountdownClock::new(),
            sync: RemoteSync::new(),
            schema: SchemaMap::new(),
            deferred_refresh_at: None,
            last_fetch_error: None,
        }
    }

    /// Convenience constructor over the HTTP transport.
    pub fn over_http(config: GameApiConfig) -> Result<Self, game_backend::BackendError> {
        Ok(Self::new(Arc::new(HttpGameBackend::new(config)?)))
    }

    // --- pull-based render state -------------------------------------------

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn sessions_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    #[must_use]
    pub fn investigations(&self) -> &[Investigation] {
        self.tracker.items()
    }

    #[must_use]
    pub fn countdown_display(&self) -> String {
        self.clock.display()
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.clock.expired()
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        self.sync.player_name()
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.sync.round()
    }

    #[must_use]
    pub fn final_submit_visible(&self) -> bool {
        self.sync.final_submit_visible()
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    /// Inline error affordance for the most recent failed read; cleared by the
    /// next successful read.
    #[must_use]
    pub fn last_fetch_error(&self) -> Option<&str> {
        self.last_fetch_error.as_deref()
    }

    #[must_use]
    pub fn staged_final_answer(&self) -> Option<&str> {
        self.tracker.staged_final_answer()
    }

    // --- lifecycle ---------------------------------------------------------

    /// Initial page load: authoritative state sync plus investigation and
    /// schema fetches. Read-path failures retain previous (empty) state and
    /// surface through [`GameApp::last_fetch_error`]; only an invalid session
    /// is fatal.
    pub async fn init(&mut self, navigator: &mut dyn Navigator) -> Result<(), GameError> {
        self.sync_state(navigator).await?;
        if let Err(error) = self.load_investigations().await {
            tracing::warn!(%error, "initial investigation load failed");
        }
        if let Err(error) = self.load_schema().await {
            tracing::warn!(%error, "initial schema load failed");
        }
        Ok(())
    }

    /// One-second cadence driver: advances the countdown and runs a due
    /// deferred investigation refresh. On the expiry tick the session is
    /// terminated through the navigator, exactly once.
    pub async fn heartbeat(&mut self, navigator: &mut dyn Navigator) -> Result<(), GameError> {
        match self.on_tick(navigator) {
            TickOutcome::Expired => return Err(GameError::SessionExpired),
            TickOutcome::AlreadyExpired => return Ok(()),
            TickOutcome::Counting => {}
        }

        if self
            .deferred_refresh_at
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.deferred_refresh_at = None;
            self.run_deferred_refresh().await;
        }
        Ok(())
    }

    /// Advances the clock by one tick, forcing logout navigation on the expiry
    /// transition.
    pub fn on_tick(&mut self, navigator: &mut dyn Navigator) -> TickOutcome {
        let outcome = self.clock.tick();
        if outcome == TickOutcome::Expired {
            navigator.navigate(NavigationTarget::Logout);
        }
        outcome
    }

    async fn sync_state(&mut self, navigator: &mut dyn Navigator) -> Result<(), GameError> {
        match self.sync.sync(self.backend.as_ref(), &mut self.clock).await {
            Err(error @ GameError::SessionInvalid { .. }) => {
                navigator.navigate(NavigationTarget::Root);
                Err(error)
            }
            other => other,
        }
    }

    // --- investigations ----------------------------------------------------

    /// Re-fetches the visible investigation set, replacing it wholesale. On
    /// failure the previous collection is retained.
    pub async fn load_investigations(&mut self) -> Result<(), GameError> {
        match self.backend.fetch_investigations().await {
            Ok(records) => {
                self.tracker.replace_items(records);
                self.last_fetch_error = None;
                if self.tracker.schedule_refresh_if_all_solved() {
                    tracing::debug!("all visible investigations solved; deferring a refresh");
                    self.deferred_refresh_at = Some(Instant::now() + DEFERRED_REFRESH_DELAY);
                }
                Ok(())
            }
            Err(source) => {
                let error = GameError::Fetch {
                    what: "investigations",
                    source,
                };
                self.last_fetch_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Runs the deferred all-solved refresh if one is armed.
    pub async fn run_deferred_refresh(&mut self) {
        if !self.tracker.begin_deferred_refresh() {
            return;
        }
        if let Err(error) = self.load_investigations().await {
            tracing::warn!(%error, "deferred investigation refresh failed");
        }
    }

    /// True while an all-solved refresh is armed but has not run yet.
    #[must_use]
    pub fn refresh_pending(&self) -> bool {
        self.tracker.refresh_pending()
    }

    /// Submits one answer through the per-item verify flow.
    ///
    /// Rejected locally when the trimmed answer is empty or a verify for the
    /// same id is already in flight. A correct answer triggers an
    /// investigation re-fetch and a state sync (round and time may have
    /// changed); an incorrect one changes no stored state.
    pub async fn submit_answer(
        &mut self,
        id: InvestigationId,
        answer: &str,
        navigator: &mut dyn Navigator,
    ) -> Result<(), GameError> {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return Err(GameError::EmptyAnswer);
        }

        self.tracker.begin_submission(id)?;
        let result = self
            .backend
            .verify(VerifyRequest {
                id,
                answer: trimmed.to_string(),
            })
            .await;
        self.tracker.finish_submission(id);

        match result {
            Ok(outcome) if outcome.correct => {
                tracing::info!(id, "investigation solved");
                if let Err(error) = self.load_investigations().await {
                    tracing::warn!(%error, "post-solve investigation reload failed");
                }
                self.sync_state(navigator).await?;
                Ok(())
            }
            Ok(_) => Err(GameError::Incorrect { id }),
            Err(source) => Err(GameError::Submission { id, source }),
        }
    }

    /// Stages the final-gate answer locally; no network call.
    pub fn stage_final_answer(&mut self, value: &str) {
        self.tracker.stage_final_answer(value);
    }

    /// Submits the final report.
    ///
    /// Requires a staged non-empty answer (checked before prompting) and an
    /// explicit confirmation. The per-item verify for the final-gate id is
    /// sent first for scoring; its outcome is ignored, and the report is
    /// submitted regardless — only a transport failure aborts. Success is
    /// terminal for the interaction.
    pub async fn submit_final(
        &mut self,
        confirm: &mut dyn ConfirmPrompt,
    ) -> Result<(), GameError> {
        let Some(answer) = self.tracker.staged_final_answer().map(str::to_string) else {
            return Err(GameError::MissingFinalAnswer);
        };

        let prompt = format!("Submit final answer: \"{answer}\"? This cannot be undone.");
        if !confirm.confirm(&prompt) {
            return Err(GameError::FinalNotConfirmed);
        }

        let id = self.tracker.final_gate_id();
        self.tracker.begin_submission(id)?;
        let verify = self
            .backend
            .verify(VerifyRequest {
                id,
                answer: answer.clone(),
            })
            .await;

        let result = match verify {
            Ok(_) => self
                .backend
                .submit_final_report(&answer)
                .await
                .map_err(|source| GameError::Submission { id, source }),
            Err(source) => Err(GameError::Submission { id, source }),
        };
        self.tracker.finish_submission(id);

        if result.is_ok() {
            tracing::info!("final report submitted");
        }
        result
    }

    // --- queries and schema ------------------------------------------------

    /// Executes the active session's live buffer against the game database.
    ///
    /// The live buffer is captured (and persisted to the active session)
    /// before sending. In-band SQL failures arrive as
    /// [`QueryOutcome::Failed`]; only transport-level problems are errors.
    pub async fn run_active_query(
        &mut self,
        surface: &mut dyn EditorSurface,
    ) -> Result<QueryOutcome, GameError> {
        let snapshot = surface.capture();
        self.store.set_active_buffer(snapshot.buffer.clone());
        self.backend
            .run_query(&snapshot.buffer)
            .await
            .map_err(|source| GameError::Fetch {
                what: "query result",
                source,
            })
    }

    /// Re-fetches the visible table schema; failure retains the previous map.
    pub async fn load_schema(&mut self) -> Result<(), GameError> {
        match self.backend.fetch_schema().await {
            Ok(schema) => {
                self.schema = schema;
                self.last_fetch_error = None;
                Ok(())
            }
            Err(source) => {
                let error = GameError::Fetch {
                    what: "schema",
                    source,
                };
                self.last_fetch_error = Some(error.to_string());
                Err(error)
            }
        }
    }
}
