//! Presentation-side capabilities the orchestrator depends on.
//!
//! The core never touches a rendering surface directly; it works against these
//! narrow ports so the session store, expiry transition, and final-report
//! confirmation stay independent of any concrete UI.

/// Point-in-time copy of the live editor text and rendered result surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BufferSnapshot {
    pub buffer: String,
    pub output: String,
}

/// Capture/restore pair over the live query editor and result area.
///
/// `capture` reads whatever the user currently sees; `restore` replaces it.
/// The session store calls these around every tab switch so unsubmitted edits
/// survive the switch.
pub trait EditorSurface {
    fn capture(&mut self) -> BufferSnapshot;
    fn restore(&mut self, snapshot: &BufferSnapshot);
}

/// Forced-navigation destinations for the two fatal exits.
///
/// Countdown expiry and state-sync rejection are distinct failure domains and
/// keep distinct targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Session termination after countdown expiry.
    Logout,
    /// Session no longer recognized by the server.
    Root,
}

/// Hard-navigation capability. There is no return from a `navigate` call as
/// far as the orchestrator is concerned.
pub trait Navigator {
    fn navigate(&mut self, target: NavigationTarget);
}

/// Yes/no gate shown before the irreversible final report submission.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}
