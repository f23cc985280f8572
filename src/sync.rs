//! Boundary reconciling local state with server-authoritative state.
//!
//! A successful sync seeds the countdown and refreshes the round and player
//! identity. A well-formed server rejection means the session is no longer
//! recognized and must end in a hard navigation; a transport failure is soft
//! and leaves all prior state untouched.

use game_backend::{GameBackend, StateSnapshot};

use crate::clock::CountdownClock;
use crate::error::GameError;

/// Round at which the final-report affordance becomes visible.
const FINAL_REPORT_ROUND: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteSync {
    player_name: String,
    round: u32,
}

impl RemoteSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Server-reported round; zero until the first successful sync.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Round-gated visibility flag for the final-report affordance.
    #[must_use]
    pub fn final_submit_visible(&self) -> bool {
        self.round >= FINAL_REPORT_ROUND
    }

    /// Fetches authoritative state and applies it.
    pub async fn sync(
        &mut self,
        backend: &dyn GameBackend,
        clock: &mut CountdownClock,
    ) -> Result<(), GameError> {
        match backend.fetch_state().await {
            Ok(snapshot) => {
                self.apply(&snapshot, clock);
                Ok(())
            }
            Err(error) if error.is_rejection() => {
                tracing::error!(%error, "server no longer recognizes the session");
                Err(GameError::SessionInvalid {
                    message: error.to_string(),
                })
            }
            Err(error) => {
                tracing::warn!(%error, "state sync failed; keeping prior state");
                Ok(())
            }
        }
    }

    fn apply(&mut self, snapshot: &StateSnapshot, clock: &mut CountdownClock) {
        clock.seed(snapshot.remaining_time);
        self.round = snapshot.round;
        self.player_name = snapshot.name.clone();
        tracing::debug!(
            round = snapshot.round,
            remaining = snapshot.remaining_time,
            "state synced"
        );
    }
}
