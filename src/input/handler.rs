use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press means while an agent is being watched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    SpeedUp,
    SlowDown,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => KeyAction::SpeedUp,
            KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Down => KeyAction::SlowDown,
            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
