//! Frame painting.
//!
//! Draws the chrome (title, menu, separators, status), the line-number
//! gutter, the syntax-colored editor text, and the two side panes. The
//! editor text is produced by streaming the wrapped buffer through a
//! [`TextStream`] sink that walks the token vector in step with the
//! emitted positions.

use chrono::Local;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::style::{Modifier, Style};
use ratatui::Frame;

use crate::app::Model;
use crate::content::{Cursor, Selection, TextStream};
use crate::tokenizer::{Token, TokenKind};
use crate::ui::{token_style, Pane, Theme, MENU_TEXT};

/// Paint one complete frame.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = model.layout;
    let theme = model.theme;
    let buf = frame.buffer_mut();

    fill(buf, 0, 0, area.width, area.height, theme.base());

    // Title row: application name left, today's date right.
    buf.set_string(1, 0, "Rulepad", theme.base().add_modifier(Modifier::BOLD));
    let date = Local::now().format("%Y-%m-%d").to_string();
    buf.set_string(
        area.width.saturating_sub(11),
        0,
        date,
        theme.base().add_modifier(Modifier::BOLD),
    );

    // Menu row.
    fill(buf, 0, 1, area.width, 1, theme.menu());
    buf.set_string(1, 1, MENU_TEXT, theme.menu());

    // Pane separators.
    for y in 2..area.height.saturating_sub(1) {
        put(buf, layout.vsplit, y, '│', theme.base());
    }
    for x in layout.vsplit + 1..area.width {
        put(buf, x, layout.hsplit, '─', theme.base());
    }
    put(buf, layout.vsplit, layout.hsplit, '├', theme.base());

    render_gutter(model, buf);
    render_editor(model, buf);
    render_completions(model, buf);
    render_diagnostics(model, buf);

    // Status row: file path and 1-based cursor position.
    let status_y = area.height.saturating_sub(1);
    fill(buf, 0, status_y, area.width, 1, theme.menu());
    let path = model
        .content
        .path()
        .map_or_else(|| "(untitled)".to_string(), |p| p.display().to_string());
    let cursor = model.content.cursor;
    let status = format!("{} {}:{}", path, cursor.line + 1, cursor.column + 1);
    buf.set_string(1, status_y, status, theme.menu());

    render_cursor(model, frame);
}

fn render_gutter(model: &Model, buf: &mut Buffer) {
    let gutter = model.layout.gutter;
    let theme = model.theme;
    fill(buf, gutter.left, gutter.top, gutter.width, gutter.height, theme.gutter());

    let number_width = gutter.width.saturating_sub(2) as usize;
    let editor = model.layout.editor;
    let start = editor.line_offset;
    let end = start + editor.height as usize;
    let cursor_line = model.content.cursor.line;
    model
        .content
        .stream_lines(start, end, editor.width as usize, &mut |line, row| {
            let style = if line == cursor_line {
                theme.gutter_current()
            } else {
                theme.gutter()
            };
            let text = format!(" {:>number_width$} ", line + 1);
            buf.set_string(gutter.left, gutter.top + row as u16, text, style);
        });
}

fn render_editor(model: &Model, buf: &mut Buffer) {
    let editor = model.layout.editor;
    let mut sink = EditorSink {
        buf,
        tokens: &model.tokens,
        index: 0,
        theme: model.theme,
        pane: editor,
        selection: model.content.selection,
    };
    model.content.stream_text(
        editor.line_offset,
        editor.line_offset + editor.height as usize,
        editor.width as usize,
        &mut sink,
    );
}

/// Streams buffer text into the frame, styling each character by the token
/// covering its position.
struct EditorSink<'a> {
    buf: &'a mut Buffer,
    tokens: &'a [Token],
    index: usize,
    theme: Theme,
    pane: Pane,
    selection: Option<Selection>,
}

impl EditorSink<'_> {
    fn put(&mut self, ch: char, screen: Cursor, style: Style) {
        if screen.line >= self.pane.height as usize || screen.column >= self.pane.width as usize {
            return;
        }
        put(
            self.buf,
            self.pane.left + screen.column as u16,
            self.pane.top + screen.line as u16,
            ch,
            style,
        );
    }
}

impl TextStream for EditorSink<'_> {
    fn rune(&mut self, ch: char, content: Cursor, screen: Cursor) {
        while let Some(token) = self.tokens.get(self.index) {
            if token.line < content.line
                || (token.line == content.line && token.end_column() <= content.column)
            {
                self.index += 1;
            } else {
                break;
            }
        }
        let kind = self
            .tokens
            .get(self.index)
            .map_or(TokenKind::EndMarker, |t| t.kind);
        let mut style = token_style(kind, self.theme);
        if self.selection.is_some_and(|s| s.contains(content)) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        self.put(ch, screen, style);
    }

    fn break_rune(&mut self, screen: Cursor) {
        let style = self.theme.wrapper();
        self.put('↓', screen, style);
    }

    fn continue_rune(&mut self, screen: Cursor) {
        let style = self.theme.wrapper();
        self.put('→', screen, style);
    }
}

fn render_completions(model: &Model, buf: &mut Buffer) {
    let pane = model.layout.completions;
    for (index, candidate) in model.completions.items().iter().enumerate() {
        // Canonical fields indent one cell so sigiled names line up.
        let text = if candidate.kind == TokenKind::CanonicalField {
            format!(" {}", candidate.name)
        } else {
            candidate.name.clone()
        };
        if let Some((clipped, y, x)) = pane.clip_text(&text, index, 0) {
            buf.set_string(x, y, clipped, token_style(candidate.kind, model.theme));
        }
    }
}

fn render_diagnostics(model: &Model, buf: &mut Buffer) {
    let pane = model.layout.diagnostics;
    for (index, row) in model.diagnostic_rows.iter().enumerate() {
        if let Some((clipped, y, x)) = pane.clip_text(&row.text, index, 0) {
            buf.set_string(x, y, clipped, model.theme.base());
        }
    }
}

fn render_cursor(model: &Model, frame: &mut Frame) {
    let editor = model.layout.editor;
    let screen = model
        .content
        .screen_position(model.content.cursor, editor.width as usize);
    if screen.line < editor.line_offset {
        return;
    }
    let row = screen.line - editor.line_offset;
    if row >= editor.height as usize || screen.column >= editor.width as usize {
        return;
    }
    frame.set_cursor_position(Position::new(
        editor.left + screen.column as u16,
        editor.top + row as u16,
    ));
}

fn fill(buf: &mut Buffer, x: u16, y: u16, width: u16, height: u16, style: Style) {
    for row in y..y.saturating_add(height) {
        for col in x..x.saturating_add(width) {
            put(buf, col, row, ' ', style);
        }
    }
}

fn put(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut(Position::new(x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}
