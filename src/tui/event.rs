use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::action::Key;

/// Block until a key press arrives and translate it. Mouse, resize and
/// key-release events are skipped.
pub fn read_key() -> std::io::Result<Key> {
    loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind != KeyEventKind::Press {
                continue;
            }
            log::debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            if let Some(key) = translate(key_event) {
                return Ok(key);
            }
        }
    }
}

/// Map a crossterm key event to an input code. Keys the viewer has no use
/// for at all return `None`, as does every Ctrl chord except Ctrl+C.
pub fn translate(key_event: KeyEvent) -> Option<Key> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        // Ctrl+C is the raw-mode equivalent of the terminal's exit key
        return match key_event.code {
            KeyCode::Char('c' | 'C') => Some(Key::Exit),
            _ => None,
        };
    }
    match (key_event.modifiers, key_event.code) {
        (_, KeyCode::Char(c)) => Some(Key::Char(c)),
        (_, KeyCode::Esc) => Some(Key::Esc),
        (_, KeyCode::Up) => Some(Key::Up),
        (_, KeyCode::Down) => Some(Key::Down),
        (_, KeyCode::PageUp) => Some(Key::PageUp),
        (_, KeyCode::PageDown) => Some(Key::PageDown),
        (_, KeyCode::Home) => Some(Key::Home),
        (_, KeyCode::End) => Some(Key::End),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_ctrl_c_is_exit() {
        assert_eq!(
            translate(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Key::Exit)
        );
        assert_eq!(
            translate(press(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Key::Char('c'))
        );
    }

    #[test]
    fn test_ctrl_shift_c_is_exit() {
        assert_eq!(
            translate(press(
                KeyCode::Char('C'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            )),
            Some(Key::Exit)
        );
    }

    #[test]
    fn test_other_ctrl_chords_are_ignored() {
        assert_eq!(translate(press(KeyCode::Char('d'), KeyModifiers::CONTROL)), None);
        assert_eq!(translate(press(KeyCode::Char('o'), KeyModifiers::CONTROL)), None);
        assert_eq!(
            translate(press(
                KeyCode::Char('D'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            )),
            None
        );
        assert_eq!(translate(press(KeyCode::Down, KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn test_shifted_letters_pass_through() {
        assert_eq!(
            translate(press(KeyCode::Char('D'), KeyModifiers::SHIFT)),
            Some(Key::Char('D'))
        );
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(translate(press(KeyCode::Esc, KeyModifiers::NONE)), Some(Key::Esc));
        assert_eq!(translate(press(KeyCode::Home, KeyModifiers::NONE)), Some(Key::Home));
        assert_eq!(translate(press(KeyCode::End, KeyModifiers::NONE)), Some(Key::End));
        assert_eq!(translate(press(KeyCode::PageDown, KeyModifiers::NONE)), Some(Key::PageDown));
        assert_eq!(translate(press(KeyCode::Enter, KeyModifiers::NONE)), None);
        assert_eq!(translate(press(KeyCode::F(5), KeyModifiers::NONE)), None);
    }
}
