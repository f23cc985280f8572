//! Client-side session orchestrator for a SQL investigation terminal game.
//!
//! The page has three pieces with real state-machine and lifecycle concerns,
//! and this crate owns all of them:
//!
//! - a [`sessions::SessionStore`] multiplexing independent terminal tabs,
//!   each with its own query buffer and last rendered result;
//! - an [`investigations::ProgressTracker`] driving the round-gated puzzle
//!   progression, answer verification, and the staged final report;
//! - a [`clock::CountdownClock`] running the one-shot expiry transition that
//!   forces session termination when the time budget elapses.
//!
//! ## Embedding contract
//!
//! Construct a [`GameApp`] over a [`game_backend::GameBackend`] (HTTP via
//! [`GameApp::over_http`], or `game_backend_mock` in tests), call
//! [`GameApp::init`] once, then:
//!
//! - drive [`GameApp::heartbeat`] once per second;
//! - route user actions to `submit_answer`, `stage_final_answer`,
//!   `submit_final`, `run_active_query`, and the session store operations;
//! - pull render state through the synchronous getters after each action.
//!
//! Rendering, theming, and notepad persistence are presentation concerns and
//! live behind the narrow ports in [`ports`].

pub mod app;
pub mod clock;
pub mod error;
pub mod investigations;
pub mod ports;
pub mod sessions;
pub mod sync;

pub use app::GameApp;
pub use clock::{CountdownClock, TickOutcome};
pub use error::GameError;
pub use investigations::{
    Investigation, InvestigationKind, ProgressTracker, DEFAULT_FINAL_GATE_ID,
};
pub use ports::{BufferSnapshot, ConfirmPrompt, EditorSurface, NavigationTarget, Navigator};
pub use sessions::{SessionStore, SessionStoreError, TabView, TerminalSession, READY_PLACEHOLDER};
pub use sync::RemoteSync;
