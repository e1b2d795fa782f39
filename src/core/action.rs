//! # Actions
//!
//! Everything the user can do in the viewer becomes an `Action`.
//! Raw input is translated into a [`Key`] by the terminal adapter, and
//! [`Action::from_key`] resolves it once, at the input boundary. Nothing
//! past this point ever looks at key codes.
//!
//! ```text
//! crossterm KeyEvent  →  Key  →  Action  →  Dispatcher  →  Effect
//! ```

/// Platform-neutral input code, as produced by the terminal adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Esc,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// The platform's "exit" key (Ctrl+C in a raw-mode terminal).
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    DeleteSelected,
    OpenSelected,
    CheckLinks,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    JumpFirst,
    JumpLast,
}

impl Action {
    /// Resolve an input code. Unmapped codes yield `None` and are ignored.
    ///
    /// Command letters (`q`, `d`, `o`, `c`) match in either case; the vi
    /// movement keys `j`/`k` are lowercase only.
    pub fn from_key(key: Key) -> Option<Action> {
        match key {
            Key::Esc | Key::Exit => Some(Action::Quit),
            Key::Up | Key::Char('k') => Some(Action::MoveUp),
            Key::Down | Key::Char('j') => Some(Action::MoveDown),
            Key::PageUp => Some(Action::PageUp),
            Key::PageDown | Key::Char(' ') => Some(Action::PageDown),
            Key::Home => Some(Action::JumpFirst),
            Key::End => Some(Action::JumpLast),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'q' => Some(Action::Quit),
                'd' => Some(Action::DeleteSelected),
                'o' => Some(Action::OpenSelected),
                'c' => Some(Action::CheckLinks),
                _ => None,
            },
        }
    }
}

/// What the interaction loop should do after an action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}
