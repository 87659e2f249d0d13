//! The complete application state.

use crate::completion::{completions_at, CompletionList};
use crate::content::{Content, Cursor};
use crate::meta::Meta;
use crate::parser::{Analysis, Parser};
use crate::tokenizer::{tokenize, Token};
use crate::ui::{wrap_message, Pane, Theme};

/// One rendered diagnostics-pane row, pointing back at the diagnostic's
/// token position for mouse navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRow {
    pub text: String,
    pub line: usize,
    pub column: usize,
}

/// The screen regions. A vertical split separates the editor from the side
/// column; the side column splits horizontally into completions above and
/// diagnostics below.
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub vsplit: u16,
    pub hsplit: u16,
    pub gutter: Pane,
    pub editor: Pane,
    pub completions: Pane,
    pub diagnostics: Pane,
}

impl Layout {
    pub fn resize(&mut self, width: u16, height: u16, line_count: usize) {
        self.width = width;
        self.height = height;
        self.vsplit = if width < 128 { width / 2 } else { width - 64 };
        self.hsplit = height / 2;

        let mut gutter_width: u16 = 2;
        let mut lines = line_count;
        while lines > 0 {
            gutter_width += 1;
            lines /= 10;
        }

        let text_rows = height.saturating_sub(3);
        self.gutter.resize(2, 0, text_rows, gutter_width);
        self.editor
            .resize(2, gutter_width, text_rows, self.vsplit.saturating_sub(gutter_width));
        let side_left = self.vsplit + 1;
        let side_width = width.saturating_sub(side_left);
        self.completions
            .resize(2, side_left, self.hsplit.saturating_sub(2), side_width);
        self.diagnostics.resize(
            self.hsplit + 1,
            side_left,
            height.saturating_sub(1).saturating_sub(self.hsplit + 1),
            side_width,
        );
    }
}

/// All mutable state: the buffer, the analysis results derived from it,
/// and the screen layout.
pub struct Model {
    pub content: Content,
    pub parser: Parser,
    pub theme: Theme,
    pub tokens: Vec<Token>,
    pub analysis: Analysis,
    pub completions: CompletionList,
    pub diagnostic_rows: Vec<DiagnosticRow>,
    pub layout: Layout,
    /// Anchor of an in-progress mouse selection.
    pub drag_anchor: Option<Cursor>,
    pub should_quit: bool,
}

impl Model {
    pub fn new(content: Content, parser: Parser, theme: Theme, size: (u16, u16)) -> Self {
        let mut model = Self {
            content,
            parser,
            theme,
            tokens: Vec::new(),
            analysis: Analysis::default(),
            completions: CompletionList::default(),
            diagnostic_rows: Vec::new(),
            layout: Layout::default(),
            drag_anchor: None,
            should_quit: false,
        };
        model.layout.resize(size.0, size.1, model.content.line_count());
        model.refresh();
        model
    }

    /// Re-run the analysis pipeline for the current buffer and cursor:
    /// tokenize, parse, recompute completions, rebuild the diagnostics
    /// rows, and pull the editor viewport to the cursor.
    pub fn refresh(&mut self) {
        self.tokens = tokenize(self.content.lines());
        self.analysis = self.parser.parse(&self.tokens);
        let cursor = self.content.cursor;
        self.completions = completions_at(
            &self.parser,
            &self.analysis,
            &self.tokens,
            cursor.line,
            cursor.column,
        );

        let width = self.layout.diagnostics.width as usize;
        self.diagnostic_rows.clear();
        for diagnostic in &self.analysis.diagnostics {
            let message = format!(
                "{}:{} {}",
                diagnostic.line + 1,
                diagnostic.column + 1,
                diagnostic.message
            );
            for text in wrap_message(&message, width) {
                self.diagnostic_rows.push(DiagnosticRow {
                    text,
                    line: diagnostic.line,
                    column: diagnostic.column,
                });
            }
        }

        self.layout.resize(
            self.layout.width,
            self.layout.height,
            self.content.line_count(),
        );
        let editor_width = self.layout.editor.width as usize;
        self.layout.editor.total_lines = self.content.wrapped_lines(editor_width);
        self.layout.completions.total_lines = self.completions.len();
        self.layout.completions.line_offset = 0;
        self.layout.diagnostics.total_lines = self.diagnostic_rows.len();

        let screen = self.content.screen_position(cursor, editor_width);
        self.layout
            .editor
            .make_cursor_visible(screen.line, screen.column);
        self.layout.gutter.line_offset = self.layout.editor.line_offset;

        tracing::trace!(
            tokens = self.tokens.len(),
            rules = self.analysis.rules.len(),
            diagnostics = self.analysis.diagnostics.len(),
            "pipeline refreshed"
        );
    }

    /// Move the cursor to the first diagnostic strictly after it in
    /// document order.
    pub fn next_diagnostic(&mut self) {
        let cursor = self.content.cursor;
        for d in &self.analysis.diagnostics {
            if d.line < cursor.line {
                continue;
            }
            if d.line > cursor.line || d.column > cursor.column {
                self.content.set_cursor(d.line, d.column);
                return;
            }
        }
    }

    /// Move the cursor to the last diagnostic strictly before it in
    /// document order.
    pub fn prev_diagnostic(&mut self) {
        let cursor = self.content.cursor;
        for d in self.analysis.diagnostics.iter().rev() {
            if d.line > cursor.line {
                continue;
            }
            if d.line < cursor.line || d.column < cursor.column {
                self.content.set_cursor(d.line, d.column);
                return;
            }
        }
    }

    /// Insert the completion at `index`, with the typed prefix removed.
    pub fn apply_completion(&mut self, index: usize) {
        if let Some(text) = self.completions.apply(index) {
            let chars: Vec<char> = text.chars().collect();
            self.content.insert_chars(&chars);
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            content: Content::from_str(""),
            parser: Parser::new(Meta::default(), Default::default(), Default::default()),
            theme: Theme::default(),
            tokens: Vec::new(),
            analysis: Analysis::default(),
            completions: CompletionList::default(),
            diagnostic_rows: Vec::new(),
            layout: Layout::default(),
            drag_anchor: None,
            should_quit: false,
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("cursor", &self.content.cursor)
            .field("tokens", &self.tokens.len())
            .field("diagnostics", &self.analysis.diagnostics.len())
            .finish_non_exhaustive()
    }
}
