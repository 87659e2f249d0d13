//! Mapping terminal events to messages.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::Message;

/// Translate a crossterm event; `None` for events the editor ignores.
pub fn handle_event(event: &Event) -> Option<Message> {
    match event {
        Event::Key(key) => handle_key(key),
        Event::Mouse(mouse) => handle_mouse(mouse),
        Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
        _ => None,
    }
}

fn handle_key(key: &KeyEvent) -> Option<Message> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('n') => Some(Message::NextDiagnostic),
            KeyCode::Char('p') => Some(Message::PrevDiagnostic),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(ch) => Some(Message::Insert(ch)),
        KeyCode::Backspace => Some(Message::Backspace),
        KeyCode::Delete => Some(Message::Delete),
        KeyCode::Enter => Some(Message::Enter),
        KeyCode::Tab => Some(Message::ApplyCompletion(0)),
        KeyCode::Left => Some(Message::MoveLeft),
        KeyCode::Right => Some(Message::MoveRight),
        KeyCode::Up => Some(Message::MoveUp),
        KeyCode::Down => Some(Message::MoveDown),
        KeyCode::Home => Some(Message::Home),
        KeyCode::End => Some(Message::End),
        KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::PageDown => Some(Message::PageDown),
        _ => None,
    }
}

fn handle_mouse(mouse: &MouseEvent) -> Option<Message> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            Some(Message::MouseDown(mouse.column, mouse.row))
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            Some(Message::MouseDrag(mouse.column, mouse.row))
        }
        MouseEventKind::Up(MouseButton::Left) => Some(Message::MouseUp),
        MouseEventKind::ScrollUp => Some(Message::Scroll(mouse.column, mouse.row, -1)),
        MouseEventKind::ScrollDown => Some(Message::Scroll(mouse.column, mouse.row, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_ctrl_q_quits() {
        assert_eq!(
            handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Message::Quit)
        );
    }

    #[test]
    fn test_plain_q_inserts() {
        assert_eq!(
            handle_event(&key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Message::Insert('q'))
        );
    }

    #[test]
    fn test_diagnostic_navigation_keys() {
        assert_eq!(
            handle_event(&key(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(Message::NextDiagnostic)
        );
        assert_eq!(
            handle_event(&key(KeyCode::Char('p'), KeyModifiers::CONTROL)),
            Some(Message::PrevDiagnostic)
        );
    }

    #[test]
    fn test_tab_applies_first_completion() {
        assert_eq!(
            handle_event(&key(KeyCode::Tab, KeyModifiers::NONE)),
            Some(Message::ApplyCompletion(0))
        );
    }

    #[test]
    fn test_wheel_maps_to_scroll() {
        let event = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(handle_event(&event), Some(Message::Scroll(7, 3, 1)));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        assert_eq!(handle_event(&key(KeyCode::F(5), KeyModifiers::NONE)), None);
    }
}
