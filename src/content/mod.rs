//! The editable character grid that feeds the analysis pipeline.
//!
//! Content is an ordered sequence of lines, each an ordered sequence of
//! Unicode scalar values. All operations are total: out-of-range cursors and
//! arguments clamp silently. The cursor may rest one line past the last line
//! and, after vertical movement from a longer line, beyond a line's end;
//! editing there pads the line with spaces.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A position in the character grid (zero-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Whether this position comes before `other` in reading order.
    pub fn before(&self, other: Cursor) -> bool {
        self.line < other.line || (self.line == other.line && self.column < other.column)
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An ordered pair of cursors, `start <= end` in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Cursor,
    pub end: Cursor,
}

impl Selection {
    /// Build a selection from two endpoints in either order.
    pub fn ordered(a: Cursor, b: Cursor) -> Self {
        if b.before(a) {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn contains(&self, pos: Cursor) -> bool {
        !pos.before(self.start) && pos.before(self.end)
    }
}

/// Consumer of the streamed, wrapped text.
///
/// Screen positions are relative to the first requested screen row.
pub trait TextStream {
    /// A character at a content position, placed at a screen position.
    fn rune(&mut self, ch: char, content: Cursor, screen: Cursor);
    /// The wrap marker at the right edge of a row that continues.
    fn break_rune(&mut self, screen: Cursor);
    /// The indent marker at the left edge of a continuation row.
    fn continue_rune(&mut self, screen: Cursor);
}

/// The editable document: character grid, cursor and selection state.
pub struct Content {
    path: Option<PathBuf>,
    lines: Vec<Vec<char>>,
    pub cursor: Cursor,
    pub selection: Option<Selection>,
}

impl Content {
    pub fn from_lines(lines: Vec<Vec<char>>) -> Self {
        Self {
            path: None,
            lines,
            cursor: Cursor::default(),
            selection: None,
        }
    }

    /// Build content from source text.
    ///
    /// Tabs become single spaces, trailing spaces are trimmed from every
    /// line, and trailing empty lines are dropped.
    pub fn from_str(text: &str) -> Self {
        let mut lines: Vec<Vec<char>> = text
            .split('\n')
            .map(|line| {
                let mut chars: Vec<char> = line
                    .chars()
                    .map(|ch| if ch == '\t' { ' ' } else { ch })
                    .collect();
                while chars.last() == Some(&' ') {
                    chars.pop();
                }
                chars
            })
            .collect();
        while lines.last().is_some_and(Vec::is_empty) {
            lines.pop();
        }
        Self::from_lines(lines)
    }

    /// Load content from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut content = Self::from_str(&text);
        content.path = Some(path.to_path_buf());
        Ok(content)
    }

    /// Write the grid back to the load path.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .context("Content has no backing file")?;
        std::fs::write(path, self.text())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Vec<char>] {
        &self.lines
    }

    /// The number of characters on a line; 0 when the line does not exist.
    pub fn columns(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, Vec::len)
    }

    /// The full document text, lines joined with `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(line.iter());
        }
        out
    }

    // --- Navigation ---

    /// Place the cursor; the line clamps to one past the last line.
    pub fn set_cursor(&mut self, line: usize, column: usize) {
        self.cursor.line = line.min(self.line_count());
        self.cursor.column = column;
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn move_up(&mut self, lines: usize) {
        self.cursor.line = self.cursor.line.saturating_sub(lines);
    }

    pub fn move_down(&mut self, lines: usize) {
        self.cursor.line = (self.cursor.line + lines).min(self.line_count());
    }

    pub fn move_left(&mut self, columns: usize) {
        self.cursor.column = self.cursor.column.saturating_sub(columns);
    }

    /// Move right, clamped to the line end; a cursor already beyond the end
    /// (reached by vertical movement) stays put.
    pub fn move_right(&mut self, columns: usize) {
        let limit = self.columns(self.cursor.line).max(self.cursor.column);
        self.cursor.column = (self.cursor.column + columns).min(limit);
    }

    pub fn move_to_bol(&mut self) {
        self.cursor.column = 0;
    }

    pub fn move_to_eol(&mut self) {
        self.cursor.column = self.columns(self.cursor.line);
    }

    // --- Editing ---

    pub fn insert_char(&mut self, ch: char) {
        self.insert_chars(&[ch]);
    }

    /// Insert characters at the cursor, creating lines and padding with
    /// spaces as needed to reach the cursor position.
    pub fn insert_chars(&mut self, chars: &[char]) {
        while self.lines.len() <= self.cursor.line {
            self.lines.push(Vec::new());
        }
        let line = &mut self.lines[self.cursor.line];
        while line.len() < self.cursor.column {
            line.push(' ');
        }
        line.splice(self.cursor.column..self.cursor.column, chars.iter().copied());
        self.cursor.column += chars.len();
    }

    /// Delete the character before the cursor; at column 0 joins the line
    /// with the previous one.
    pub fn delete_left(&mut self) {
        if self.cursor.column == 0 {
            if self.cursor.line == 0 {
                return;
            }
            let line = self.cursor.line;
            if line >= self.lines.len() {
                self.set_cursor(line - 1, self.columns(line - 1));
                return;
            }
            let tail = self.lines.remove(line);
            let column = self.lines[line - 1].len();
            self.lines[line - 1].extend(tail);
            self.set_cursor(line - 1, column);
            return;
        }
        self.cursor.column -= 1;
        self.delete_right();
    }

    /// Delete the character at the cursor; a no-op at or past the line end.
    pub fn delete_right(&mut self) {
        let Some(line) = self.lines.get_mut(self.cursor.line) else {
            return;
        };
        if self.cursor.column < line.len() {
            line.remove(self.cursor.column);
        }
    }

    /// Split the current line at the cursor; past the last line this is a
    /// no-op.
    pub fn split_line(&mut self) {
        if self.cursor.line >= self.lines.len() {
            return;
        }
        let column = self.cursor.column.min(self.lines[self.cursor.line].len());
        let tail = self.lines[self.cursor.line].split_off(column);
        self.lines.insert(self.cursor.line + 1, tail);
        self.set_cursor(self.cursor.line + 1, 0);
    }

    // --- Visual wrapping ---

    /// Screen rows taken by one line at display width `width` (>= 6).
    ///
    /// The first piece holds `width - 1` characters; continuation pieces
    /// reserve four columns for the indent marker and hold `width - 5`.
    fn line_rows(len: usize, width: usize) -> usize {
        let width = width.max(6);
        if len < width - 1 {
            1
        } else {
            (len - 5) / (width - 5) + 1
        }
    }

    /// Total screen rows for the document at display width `width`.
    pub fn wrapped_lines(&self, width: usize) -> usize {
        self.lines
            .iter()
            .map(|line| Self::line_rows(line.len(), width))
            .sum()
    }

    /// Stream the wrapped text for screen rows `start..end` at display
    /// width `width`. Screen coordinates are relative to `start`; emission
    /// stops after row `end - 1`.
    pub fn stream_text(&self, start: usize, end: usize, width: usize, sink: &mut dyn TextStream) {
        let width = width.max(6);
        let mut row = 0usize;
        for (line_idx, line) in self.lines.iter().enumerate() {
            let mut col = 0usize;
            let mut piece = 0usize;
            loop {
                if row >= end {
                    return;
                }
                let capacity = if piece == 0 { width - 1 } else { width - 5 };
                let indent = if piece == 0 { 0 } else { 4 };
                let take = capacity.min(line.len() - col);
                if row >= start {
                    let screen_line = row - start;
                    if piece > 0 {
                        sink.continue_rune(Cursor::new(screen_line, 3));
                    }
                    for i in 0..take {
                        sink.rune(
                            line[col + i],
                            Cursor::new(line_idx, col + i),
                            Cursor::new(screen_line, indent + i),
                        );
                    }
                    if col + take < line.len() {
                        sink.break_rune(Cursor::new(screen_line, width - 1));
                    }
                }
                col += take;
                row += 1;
                piece += 1;
                if col >= line.len() {
                    break;
                }
            }
        }
    }

    /// Report `(content_line, screen_row)` for every line whose first
    /// screen row falls in `start..end`; screen rows are relative to
    /// `start`. Supports the line-number gutter.
    pub fn stream_lines(&self, start: usize, end: usize, width: usize, f: &mut dyn FnMut(usize, usize)) {
        let mut row = 0usize;
        for (line_idx, line) in self.lines.iter().enumerate() {
            if row >= end {
                return;
            }
            if row >= start {
                f(line_idx, row - start);
            }
            row += Self::line_rows(line.len(), width);
        }
    }

    /// Screen position of a content position at display width `width`,
    /// counted from the document top.
    pub fn screen_position(&self, pos: Cursor, width: usize) -> Cursor {
        let width = width.max(6);
        let rows_before: usize = self
            .lines
            .iter()
            .take(pos.line)
            .map(|line| Self::line_rows(line.len(), width))
            .sum();
        if pos.column < width - 1 {
            Cursor::new(rows_before, pos.column)
        } else {
            let past = pos.column - (width - 1);
            let piece = 1 + past / (width - 5);
            Cursor::new(rows_before + piece, 4 + past % (width - 5))
        }
    }

    /// The content position shown at a screen position (counted from the
    /// document top) at display width `width`. Rows past the document map
    /// to the virtual line after the last; clicks in a continuation indent
    /// snap to the piece's first character.
    pub fn content_position(&self, screen: Cursor, width: usize) -> Cursor {
        let width = width.max(6);
        let mut row = 0usize;
        for (line_idx, line) in self.lines.iter().enumerate() {
            let rows = Self::line_rows(line.len(), width);
            if screen.line < row + rows {
                let piece = screen.line - row;
                let column = if piece == 0 {
                    screen.column.min(width - 1)
                } else {
                    (width - 1) + (piece - 1) * (width - 5) + screen.column.saturating_sub(4)
                };
                return Cursor::new(line_idx, column.min(line.len()));
            }
            row += rows;
        }
        Cursor::new(self.lines.len(), screen.column)
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Content")
            .field("lines", &self.lines.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
