//! Theming: pure mapping from token kinds to terminal styles.
//!
//! Three themes are supported. Style selection is a pure function of
//! `(TokenKind, Theme)`; there is no global style state.

use ratatui::style::{Color, Modifier, Style};

use crate::tokenizer::TokenKind;

/// The color theme for the whole application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Blue,
    Dark,
    Light,
}

const SILVER: Color = Color::Rgb(0xc0, 0xc0, 0xc0);
const GOLD: Color = Color::Rgb(0xff, 0xd7, 0x00);
const TURQUOISE: Color = Color::Rgb(0x40, 0xe0, 0xd0);
const GREEN_YELLOW: Color = Color::Rgb(0xad, 0xff, 0x2f);
const DARK_GREEN: Color = Color::Rgb(0x00, 0x64, 0x00);
const LIGHT_SKY_BLUE: Color = Color::Rgb(0x87, 0xce, 0xfa);

impl Theme {
    /// Background color behind the text panes.
    pub fn background(self) -> Color {
        match self {
            Self::Blue => Color::Indexed(17),
            Self::Dark => Color::Indexed(235),
            Self::Light => Color::Indexed(231),
        }
    }

    /// Base style for pane text.
    pub fn base(self) -> Style {
        let fg = match self {
            Self::Blue | Self::Dark => Color::Indexed(231),
            Self::Light => Color::Black,
        };
        Style::default().fg(fg).bg(self.background())
    }

    /// Line-number gutter style.
    pub fn gutter(self) -> Style {
        match self {
            Self::Blue => Style::default().fg(SILVER).bg(Color::Indexed(18)),
            Self::Dark => Style::default().fg(Color::Indexed(231)).bg(Color::Indexed(238)),
            Self::Light => Style::default().fg(Color::Black).bg(Color::Indexed(250)),
        }
    }

    /// Gutter style for the cursor's line.
    pub fn gutter_current(self) -> Style {
        match self {
            Self::Blue => Style::default().fg(Color::Indexed(231)).bg(Color::Indexed(19)),
            Self::Dark => Style::default().fg(Color::Indexed(231)).bg(Color::Indexed(242)),
            Self::Light => Style::default()
                .fg(Color::Black)
                .bg(Color::Indexed(248))
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Menu and status bar style.
    pub fn menu(self) -> Style {
        let fg = match self {
            Self::Blue | Self::Dark => Color::Indexed(231),
            Self::Light => Color::Black,
        };
        Style::default().fg(fg).bg(SILVER)
    }

    /// Style for the soft-wrap break/continue markers.
    pub fn wrapper(self) -> Style {
        self.base().fg(LIGHT_SKY_BLUE).add_modifier(Modifier::BOLD)
    }
}

/// The style for a token kind under a theme.
pub fn token_style(kind: TokenKind, theme: Theme) -> Style {
    let style = match theme {
        Theme::Blue | Theme::Dark => main_style(kind),
        Theme::Light => light_style(kind),
    };
    style.bg(theme.background())
}

fn main_style(kind: TokenKind) -> Style {
    use TokenKind::*;
    let white = Color::Indexed(231);
    match kind {
        CanonicalField | Variable => Style::default().fg(white),
        Operation => Style::default()
            .fg(Color::Indexed(87))
            .add_modifier(Modifier::BOLD),
        Label => Style::default().fg(TURQUOISE),
        Input => Style::default().fg(GREEN_YELLOW),
        OpenParen | CloseParen | EqualSign | Semicolon => {
            Style::default().fg(white).add_modifier(Modifier::BOLD)
        }
        Comment => Style::default().fg(Color::Rgb(0xad, 0xad, 0xad)),
        StringLiteral | IntegerLiteral | RealLiteral | BooleanLiteral | NilLiteral
        | DateLiteral | DaySpanLiteral | MonthSpanLiteral | YearSpanLiteral | TodayLiteral => {
            Style::default().fg(GOLD)
        }
        InvalidToken => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        EndMarker => Style::default().fg(white),
    }
}

fn light_style(kind: TokenKind) -> Style {
    use TokenKind::*;
    match kind {
        CanonicalField | Variable => Style::default().fg(Color::Black),
        Operation => Style::default()
            .fg(Color::Indexed(18))
            .add_modifier(Modifier::BOLD),
        Label => Style::default().fg(Color::Rgb(0x00, 0x3f, 0x3f)),
        Input => Style::default().fg(DARK_GREEN),
        OpenParen | CloseParen | EqualSign | Semicolon => {
            Style::default().fg(Color::Black).add_modifier(Modifier::BOLD)
        }
        Comment => Style::default().fg(Color::Rgb(0x3d, 0x3d, 0x3d)),
        StringLiteral | IntegerLiteral | RealLiteral | BooleanLiteral | NilLiteral
        | DateLiteral | DaySpanLiteral | MonthSpanLiteral | YearSpanLiteral | TodayLiteral => {
            Style::default().fg(Color::Rgb(0x3f, 0x3f, 0x00))
        }
        InvalidToken => Style::default()
            .fg(Color::Rgb(0x7f, 0x00, 0x00))
            .add_modifier(Modifier::BOLD),
        EndMarker => Style::default().fg(Color::Black),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_style_in_every_theme() {
        use TokenKind::*;
        let kinds = [
            InvalidToken,
            CanonicalField,
            Operation,
            Variable,
            Input,
            Label,
            StringLiteral,
            IntegerLiteral,
            RealLiteral,
            BooleanLiteral,
            NilLiteral,
            DateLiteral,
            DaySpanLiteral,
            MonthSpanLiteral,
            YearSpanLiteral,
            TodayLiteral,
            EqualSign,
            Semicolon,
            OpenParen,
            CloseParen,
            Comment,
            EndMarker,
        ];
        for theme in [Theme::Blue, Theme::Dark, Theme::Light] {
            for kind in kinds {
                let style = token_style(kind, theme);
                assert!(style.fg.is_some(), "{kind} missing fg in {theme:?}");
                assert_eq!(style.bg, Some(theme.background()));
            }
        }
    }

    #[test]
    fn test_operations_are_bold() {
        for theme in [Theme::Blue, Theme::Dark, Theme::Light] {
            let style = token_style(TokenKind::Operation, theme);
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_invalid_tokens_stand_out() {
        let style = token_style(TokenKind::InvalidToken, Theme::Blue);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_themes_differ() {
        assert_ne!(
            token_style(TokenKind::CanonicalField, Theme::Blue),
            token_style(TokenKind::CanonicalField, Theme::Light)
        );
    }
}
