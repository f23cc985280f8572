use caseterm::{BufferSnapshot, ConfirmPrompt, EditorSurface, NavigationTarget, Navigator};
use game_backend_mock::MockGameBackend;

/// Navigator that records forced navigations instead of leaving the page.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub targets: Vec<NavigationTarget>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, target: NavigationTarget) {
        self.targets.push(target);
    }
}

/// Editor/result surface backed by plain strings.
#[derive(Debug, Default)]
pub struct FakeSurface {
    pub buffer: String,
    pub output: String,
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
    }
}

/// Confirmation prompt with a scripted answer; records every prompt shown.
#[derive(Debug)]
pub struct ScriptedConfirm {
    accept: bool,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            prompts: Vec::new(),
        }
    }

    pub fn declining() -> Self {
        Self {
            accept: false,
            prompts: Vec::new(),
        }
    }
}

impl ConfirmPrompt for ScriptedConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.accept
    }
}

/// Two-round scenario: round 1 has two regular investigations, round 2 holds
/// the final-gate item.
pub fn two_round_backend() -> MockGameBackend {
    MockGameBackend::new("ada", 3661.0)
        .with_investigation(1, 1, "Who opened the vault?", "marvin")
        .with_investigation(1, 3, "Which terminal was used?", "TERM_04")
        .with_investigation(2, 2, "Name the culprit.", "miranda priestly")
}
