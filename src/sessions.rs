//! In-memory registry of terminal sub-sessions ("tabs").
//!
//! Each session owns a query buffer and the last rendered output for that
//! tab. Exactly one session is active at any time and the set is never empty;
//! closing the sole remaining session is rejected. Ids are monotonically
//! assigned and never reused within a page lifetime, even after closes.

use thiserror::Error;

use crate::ports::{BufferSnapshot, EditorSurface};

/// Monotonic per-page identifier for one terminal session.
pub type SessionId = u64;

/// Placeholder output for a session that has never run a query.
pub const READY_PLACEHOLDER: &str = "READY. AWAITING INPUT.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("cannot close the last remaining terminal session")]
    CloseLastSession,

    #[error("session index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSession {
    id: SessionId,
    buffer: String,
    last_output: String,
}

impl TerminalSession {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            buffer: String::new(),
            last_output: String::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Render-ready output: the last result, or the idle placeholder for a
    /// session that has never run anything.
    #[must_use]
    pub fn display_output(&self) -> &str {
        if self.last_output.is_empty() {
            READY_PLACEHOLDER
        } else {
            &self.last_output
        }
    }

    /// Tab-bar label, e.g. `TERM_03`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("TERM_{:02}", self.id)
    }

    fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            buffer: self.buffer.clone(),
            output: self.display_output().to_string(),
        }
    }
}

/// One tab-bar entry, pull-read by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: SessionId,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    sessions: Vec<TerminalSession>,
    active: usize,
    next_id: SessionId,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates the store with its initial session active.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: vec![TerminalSession::new(0)],
            active: 0,
            next_id: 1,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        // The invariant says never, but Vec-backed callers expect the pair.
        self.sessions.is_empty()
    }

    #[must_use]
    pub fn sessions(&self) -> &[TerminalSession] {
        &self.sessions
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> &TerminalSession {
        &self.sessions[self.active]
    }

    /// True when the tab bar should offer close affordances.
    #[must_use]
    pub fn can_close(&self) -> bool {
        self.sessions.len() > 1
    }

    /// Tab-bar view with the active flag set on exactly one entry.
    #[must_use]
    pub fn tabs(&self) -> Vec<TabView> {
        self.sessions
            .iter()
            .enumerate()
            .map(|(index, session)| TabView {
                id: session.id,
                label: session.label(),
                active: index == self.active,
            })
            .collect()
    }

    /// Overwrites the active session's buffer (e.g. a schema-click query
    /// injection from the presentation layer).
    pub fn set_active_buffer(&mut self, text: impl Into<String>) {
        self.sessions[self.active].buffer = text.into();
    }

    /// Switches the active session to `index`.
    ///
    /// Persists the outgoing session's live buffer/output first, then restores
    /// the incoming session to the surface. A no-op when `index` is already
    /// active.
    pub fn switch_to(
        &mut self,
        index: usize,
        surface: &mut dyn EditorSurface,
    ) -> Result<(), SessionStoreError> {
        if index >= self.sessions.len() {
            return Err(SessionStoreError::IndexOutOfRange {
                index,
                len: self.sessions.len(),
            });
        }
        if index == self.active {
            return Ok(());
        }

        self.persist_active(surface);
        self.active = index;
        self.restore_active(surface);
        self.check_invariant();
        Ok(())
    }

    /// Appends a fresh session with the next unused id and switches to it.
    pub fn open_new(&mut self, surface: &mut dyn EditorSurface) -> SessionId {
        self.persist_active(surface);

        let id = self.next_id;
        self.next_id += 1;
        self.sessions.push(TerminalSession::new(id));
        self.active = self.sessions.len() - 1;
        self.restore_active(surface);
        self.check_invariant();
        id
    }

    /// Removes the session at `index` and repairs the active pointer.
    ///
    /// Pointer repair: an active pointer past the removed index shifts down by
    /// one; a pointer at the removed index (or past the new end) clamps to the
    /// last valid index; a pointer before the removed index is untouched.
    pub fn close(
        &mut self,
        index: usize,
        surface: &mut dyn EditorSurface,
    ) -> Result<(), SessionStoreError> {
        if self.sessions.len() <= 1 {
            return Err(SessionStoreError::CloseLastSession);
        }
        if index >= self.sessions.len() {
            return Err(SessionStoreError::IndexOutOfRange {
                index,
                len: self.sessions.len(),
            });
        }

        self.sessions.remove(index);
        if self.active > index {
            self.active -= 1;
        } else if self.active >= self.sessions.len() {
            self.active = self.sessions.len() - 1;
        }

        self.restore_active(surface);
        self.check_invariant();
        Ok(())
    }

    fn persist_active(&mut self, surface: &mut dyn EditorSurface) {
        let snapshot = surface.capture();
        let session = &mut self.sessions[self.active];
        session.buffer = snapshot.buffer;
        session.last_output = snapshot.output;
    }

    fn restore_active(&mut self, surface: &mut dyn EditorSurface) {
        surface.restore(&self.sessions[self.active].snapshot());
    }

    fn check_invariant(&self) {
        debug_assert!(!self.sessions.is_empty());
        debug_assert!(self.active < self.sessions.len());
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::{BufferSnapshot, EditorSurface};

    use super::{SessionStore, SessionStoreError, READY_PLACEHOLDER};

    #[derive(Debug, Default)]
    struct FakeSurface {
        buffer: String,
        output: String,
        restores: usize,
    }

    impl EditorSurface for FakeSurface {
        fn capture(&mut self) -> BufferSnapshot {
            BufferSnapshot {
                buffer: self.buffer.clone(),
                output: self.output.clone(),
            }
        }

        fn restore(&mut self, snapshot: &BufferSnapshot) {
            self.buffer = snapshot.buffer.clone();
            self.output = snapshot.output.clone();
            self.restores += 1;
        }
    }

    #[test]
    fn fresh_store_has_one_active_session() {
        let store = SessionStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_index(), 0);
        assert_eq!(store.active().id(), 0);
        assert!(!store.can_close());
    }

    #[test]
    fn switch_roundtrip_restores_exact_buffer_and_output() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface {
            buffer: "SELECT * FROM guests".to_string(),
            output: "3 rows".to_string(),
            restores: 0,
        };

        store.open_new(&mut surface);
        assert_eq!(surface.buffer, "");
        assert_eq!(surface.output, READY_PLACEHOLDER);

        surface.buffer = "SELECT name FROM staff".to_string();
        surface.output = "12 rows".to_string();

        store.switch_to(0, &mut surface).expect("switch should succeed");
        assert_eq!(surface.buffer, "SELECT * FROM guests");
        assert_eq!(surface.output, "3 rows");

        store.switch_to(1, &mut surface).expect("switch should succeed");
        assert_eq!(surface.buffer, "SELECT name FROM staff");
        assert_eq!(surface.output, "12 rows");
    }

    #[test]
    fn switch_to_active_index_is_a_no_op() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();

        store.switch_to(0, &mut surface).expect("switch should succeed");
        assert_eq!(surface.restores, 0);
    }

    #[test]
    fn switch_out_of_range_is_a_usage_error() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();

        let error = store
            .switch_to(5, &mut surface)
            .expect_err("out-of-range switch should be rejected");
        assert_eq!(error, SessionStoreError::IndexOutOfRange { index: 5, len: 1 });
        assert_eq!(store.active_index(), 0);
    }

    #[test]
    fn closing_the_sole_session_is_rejected() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();

        let error = store
            .close(0, &mut surface)
            .expect_err("closing the last session should be rejected");
        assert_eq!(error, SessionStoreError::CloseLastSession);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn closing_active_session_clamps_pointer_to_successor() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();
        store.open_new(&mut surface); // ids 0, 1
        store.open_new(&mut surface); // ids 0, 1, 2
        store.switch_to(1, &mut surface).expect("switch should succeed");

        store.close(1, &mut surface).expect("close should succeed");

        // min(removed_index, len - 1) == 1: the former successor.
        assert_eq!(store.active_index(), 1);
        assert_eq!(store.active().id(), 2);
    }

    #[test]
    fn closing_last_session_while_active_clamps_to_new_end() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();
        store.open_new(&mut surface); // active index 1

        store.close(1, &mut surface).expect("close should succeed");

        assert_eq!(store.active_index(), 0);
        assert_eq!(store.active().id(), 0);
    }

    #[test]
    fn closing_before_active_shifts_pointer_down() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();
        store.open_new(&mut surface);
        store.open_new(&mut surface); // active index 2, id 2

        store.close(0, &mut surface).expect("close should succeed");

        assert_eq!(store.active_index(), 1);
        assert_eq!(store.active().id(), 2);
    }

    #[test]
    fn closing_after_active_leaves_pointer_untouched() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();
        store.open_new(&mut surface);
        store.open_new(&mut surface);
        store.switch_to(0, &mut surface).expect("switch should succeed");

        store.close(2, &mut surface).expect("close should succeed");

        assert_eq!(store.active_index(), 0);
        assert_eq!(store.active().id(), 0);
    }

    #[test]
    fn ids_are_never_reused_after_close() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();

        let first = store.open_new(&mut surface);
        store.close(1, &mut surface).expect("close should succeed");
        let second = store.open_new(&mut surface);

        assert!(second > first);
        assert_eq!(second, 2);
    }

    #[test]
    fn store_never_becomes_empty_under_open_close_sequences() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();

        for _ in 0..4 {
            store.open_new(&mut surface);
        }
        while store.can_close() {
            store.close(0, &mut surface).expect("close should succeed");
            assert!(store.len() >= 1);
            assert!(store.active_index() < store.len());
        }

        assert_eq!(store.len(), 1);
        assert!(store.close(0, &mut surface).is_err());
    }

    #[test]
    fn tab_views_mark_exactly_one_active_entry() {
        let mut store = SessionStore::new();
        let mut surface = FakeSurface::default();
        store.open_new(&mut surface);
        store.open_new(&mut surface);

        let tabs = store.tabs();
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs.iter().filter(|tab| tab.active).count(), 1);
        assert_eq!(tabs[0].label, "TERM_00");
        assert_eq!(tabs[2].label, "TERM_02");
        assert!(tabs[2].active);
    }
}
