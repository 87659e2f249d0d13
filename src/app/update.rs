//! Events and state transitions.

use crate::content::{Cursor, Selection};
use crate::ui::Pane;

use super::Model;

/// Everything that can happen to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Insert a character at the cursor (auto-pairs `(` and `"`).
    Insert(char),
    /// Delete the character before the cursor (Backspace).
    Backspace,
    /// Delete the character at the cursor (Delete).
    Delete,
    /// Split the line at the cursor (Enter).
    Enter,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Home,
    End,
    PageUp,
    PageDown,
    /// Jump to the next diagnostic after the cursor (Ctrl-N).
    NextDiagnostic,
    /// Jump to the previous diagnostic before the cursor (Ctrl-P).
    PrevDiagnostic,
    /// Insert the completion at the given index (Tab uses 0).
    ApplyCompletion(usize),
    /// Left button pressed at an absolute screen position.
    MouseDown(u16, u16),
    /// Left button dragged to an absolute screen position.
    MouseDrag(u16, u16),
    /// Left button released.
    MouseUp,
    /// Wheel scrolled over an absolute screen position.
    Scroll(u16, u16, i8),
    Resize(u16, u16),
    Quit,
}

/// Apply a message to the model.
///
/// Edits and cursor movement re-run the whole analysis pipeline; scrolling
/// only adjusts pane offsets.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Insert(ch) => {
            model.content.insert_char(ch);
            // Auto-pair: close the delimiter and step back inside it.
            if ch == '(' {
                model.content.insert_char(')');
                model.content.move_left(1);
            } else if ch == '"' {
                model.content.insert_char('"');
                model.content.move_left(1);
            }
            model.refresh();
        }
        Message::Backspace => {
            model.content.delete_left();
            model.refresh();
        }
        Message::Delete => {
            model.content.delete_right();
            model.refresh();
        }
        Message::Enter => {
            model.content.split_line();
            model.refresh();
        }
        Message::MoveLeft => {
            model.content.move_left(1);
            model.refresh();
        }
        Message::MoveRight => {
            model.content.move_right(1);
            model.refresh();
        }
        Message::MoveUp => {
            model.content.move_up(1);
            model.refresh();
        }
        Message::MoveDown => {
            model.content.move_down(1);
            model.refresh();
        }
        Message::Home => {
            model.content.move_to_bol();
            model.refresh();
        }
        Message::End => {
            model.content.move_to_eol();
            model.refresh();
        }
        Message::PageUp => {
            model.content.move_up(model.layout.editor.height as usize);
            model.refresh();
        }
        Message::PageDown => {
            model.content.move_down(model.layout.editor.height as usize);
            model.refresh();
        }
        Message::NextDiagnostic => {
            model.next_diagnostic();
            model.refresh();
        }
        Message::PrevDiagnostic => {
            model.prev_diagnostic();
            model.refresh();
        }
        Message::ApplyCompletion(index) => {
            model.apply_completion(index);
            model.refresh();
        }
        Message::MouseDown(x, y) => mouse_down(&mut model, x, y),
        Message::MouseDrag(x, y) => mouse_drag(&mut model, x, y),
        Message::MouseUp => model.drag_anchor = None,
        Message::Scroll(x, y, delta) => scroll(&mut model, x, y, delta),
        Message::Resize(width, height) => {
            model
                .layout
                .resize(width, height, model.content.line_count());
            model.refresh();
        }
        Message::Quit => model.should_quit = true,
    }
    model
}

fn editor_cursor(model: &Model, pane: Pane, x: u16, y: u16) -> Cursor {
    let (row, col) = pane.cursor_from_screen(x, y);
    model
        .content
        .content_position(Cursor::new(row, col), model.layout.editor.width as usize)
}

fn mouse_down(model: &mut Model, x: u16, y: u16) {
    let layout = model.layout;
    if layout.editor.contains(x, y) {
        let pos = editor_cursor(model, layout.editor, x, y);
        model.content.set_cursor(pos.line, pos.column);
        model.drag_anchor = Some(model.content.cursor);
        model.content.set_selection(None);
        model.refresh();
    } else if layout.gutter.contains(x, y) {
        let (row, _) = layout.gutter.cursor_from_screen(x, y);
        let pos = model
            .content
            .content_position(Cursor::new(row, 0), layout.editor.width as usize);
        model.content.set_cursor(pos.line, 0);
        model.refresh();
    } else if layout.diagnostics.contains(x, y) {
        let (row, _) = layout.diagnostics.cursor_from_screen(x, y);
        if let Some(pointer) = model.diagnostic_rows.get(row) {
            let (line, column) = (pointer.line, pointer.column);
            model.content.set_cursor(line, column);
            model.refresh();
        }
    } else if layout.completions.contains(x, y) {
        let (row, _) = layout.completions.cursor_from_screen(x, y);
        model.apply_completion(row);
        model.refresh();
    }
}

fn mouse_drag(model: &mut Model, x: u16, y: u16) {
    let layout = model.layout;
    if !layout.editor.contains(x, y) {
        return;
    }
    let Some(anchor) = model.drag_anchor else {
        return;
    };
    let pos = editor_cursor(model, layout.editor, x, y);
    model.content.set_cursor(pos.line, pos.column);
    model
        .content
        .set_selection(Some(Selection::ordered(anchor, pos)));
    model.refresh();
}

fn scroll(model: &mut Model, x: u16, y: u16, delta: i8) {
    let layout = &mut model.layout;
    let delta = isize::from(delta);
    if layout.editor.contains(x, y) || layout.gutter.contains(x, y) {
        let max = layout.editor.total_lines.saturating_sub(1);
        layout.editor.scroll(delta, max);
        layout.gutter.line_offset = layout.editor.line_offset;
    } else if layout.completions.contains(x, y) {
        let max = layout.completions.total_lines.saturating_sub(1);
        layout.completions.scroll(delta, max);
    } else if layout.diagnostics.contains(x, y) {
        let max = layout.diagnostics.total_lines.saturating_sub(1);
        layout.diagnostics.scroll(delta, max);
    }
}
