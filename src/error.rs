use game_backend::{BackendError, InvestigationId};
use thiserror::Error;

/// Orchestrator-level failure taxonomy.
///
/// Read-path failures retain previous state and surface as inline messages.
/// `SessionInvalid` and `SessionExpired` are fatal and always end in a forced
/// navigation; there is no retry path for either. Mutating calls are never
/// retried automatically.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("answer must not be empty")]
    EmptyAnswer,

    #[error("incorrect answer for investigation {id}")]
    Incorrect { id: InvestigationId },

    #[error("submission for investigation {id} failed: {source}")]
    Submission {
        id: InvestigationId,
        #[source]
        source: BackendError,
    },

    #[error("a submission for investigation {id} is already in flight")]
    SubmissionInFlight { id: InvestigationId },

    #[error("no final answer has been staged")]
    MissingFinalAnswer,

    #[error("final report submission was not confirmed")]
    FinalNotConfirmed,

    #[error("session is no longer valid: {message}")]
    SessionInvalid { message: String },

    #[error("session time expired")]
    SessionExpired,
}

impl GameError {
    /// Returns true for failures that end the session, i.e. those that always
    /// propagate to a forced navigation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionInvalid { .. } | Self::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use game_backend::BackendError;

    use super::GameError;

    #[test]
    fn only_session_ending_errors_are_fatal() {
        assert!(GameError::SessionInvalid {
            message: "Unauthorized".to_string(),
        }
        .is_fatal());
        assert!(GameError::SessionExpired.is_fatal());

        assert!(!GameError::EmptyAnswer.is_fatal());
        assert!(!GameError::Incorrect { id: 1 }.is_fatal());
        assert!(!GameError::Fetch {
            what: "investigations",
            source: BackendError::transport("/api/investigations", "connection reset"),
        }
        .is_fatal());
    }
}
