//! Lexing of the rule language.
//!
//! The tokenizer walks a two-dimensional character grid line by line and
//! produces a flat, line-ordered token stream terminated by a single
//! [`TokenKind::EndMarker`]. Classification of a regular token depends on a
//! single piece of context: whether the previously issued non-comment token
//! was an opening parenthesis (the head position of an operation call).

use chrono::NaiveDate;

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
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
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidToken => "InvalidToken",
            Self::CanonicalField => "CanonicalField",
            Self::Operation => "Operation",
            Self::Variable => "Variable",
            Self::Input => "Input",
            Self::Label => "Label",
            Self::StringLiteral => "StringLiteral",
            Self::IntegerLiteral => "IntegerLiteral",
            Self::RealLiteral => "RealLiteral",
            Self::BooleanLiteral => "BooleanLiteral",
            Self::NilLiteral => "NilLiteral",
            Self::DateLiteral => "DateLiteral",
            Self::DaySpanLiteral => "DaySpanLiteral",
            Self::MonthSpanLiteral => "MonthSpanLiteral",
            Self::YearSpanLiteral => "YearSpanLiteral",
            Self::TodayLiteral => "TodayLiteral",
            Self::EqualSign => "EqualSign",
            Self::Semicolon => "Semicolon",
            Self::OpenParen => "OpenParen",
            Self::CloseParen => "CloseParen",
            Self::Comment => "Comment",
            Self::EndMarker => "EndMarker",
        };
        f.write_str(name)
    }
}

/// A token's decoded value, when the text denotes one.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No decoded value (punctuation, comments, `today`, the end marker).
    None,
    /// String literals (unescaped), names carried by fields, variables,
    /// operations and labels; inputs carry their name without the `$`.
    Str(String),
    Int(i64),
    Real(f64),
    Date(NaiveDate),
    /// Year/month/day spans carry the signed number of units.
    Span(i64),
    Bool(bool),
    /// The `nil` marker.
    Nil,
}

/// A single token with its position in the character grid.
///
/// Lines and columns are zero-based and counted in Unicode scalar values.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    pub text: String,
    pub value: Value,
}

impl Token {
    /// One past the token's last column.
    pub fn end_column(&self) -> usize {
        self.column + self.text.chars().count()
    }

    /// Whether the token starts strictly after the given position.
    pub fn after(&self, line: usize, column: usize) -> bool {
        self.line > line || (self.line == line && self.column > column)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<{} {:?} {}:{} value={:?}>",
            self.kind, self.text, self.line, self.column, self.value
        )
    }
}

/// Tokenize a character grid.
///
/// The returned vector is ordered by (line, column) and terminated by an
/// `EndMarker` positioned at `(lines.len(), 0)`, strictly after every real
/// token.
pub fn tokenize(lines: &[Vec<char>]) -> Vec<Token> {
    let mut t = Tokenizer::default();
    for (line, chars) in lines.iter().enumerate() {
        t.tokenize_line(line, chars);
    }
    t.tokens.push(Token {
        kind: TokenKind::EndMarker,
        line: lines.len(),
        column: 0,
        text: String::new(),
        value: Value::None,
    });
    t.tokens
}

/// Tokenize source text, splitting on `\n`. Convenience for tests and tools.
pub fn tokenize_str(text: &str) -> Vec<Token> {
    let lines: Vec<Vec<char>> = text.split('\n').map(|l| l.chars().collect()).collect();
    tokenize(&lines)
}

#[derive(Default)]
struct Tokenizer {
    tokens: Vec<Token>,
    line: usize,
    column: usize,
    last_kind: Option<TokenKind>,
}

impl Tokenizer {
    fn tokenize_line(&mut self, line: usize, chars: &[char]) {
        self.line = line;
        self.column = 0;
        loop {
            self.skip_space(chars);
            if self.column >= chars.len() {
                return;
            }
            match chars[self.column] {
                '#' => self.comment(chars),
                '"' => self.string_literal(chars),
                '=' if self.last_kind != Some(TokenKind::OpenParen) => {
                    self.single(chars, TokenKind::EqualSign);
                }
                ';' => self.single(chars, TokenKind::Semicolon),
                '(' => self.single(chars, TokenKind::OpenParen),
                ')' => self.single(chars, TokenKind::CloseParen),
                _ => self.regular_token(chars),
            }
        }
    }

    fn single(&mut self, chars: &[char], kind: TokenKind) {
        let start = self.column;
        self.column += 1;
        self.token(chars, kind, start, Value::None);
    }

    fn comment(&mut self, chars: &[char]) {
        let start = self.column;
        self.column = chars.len();
        self.token(chars, TokenKind::Comment, start, Value::None);
    }

    fn string_literal(&mut self, chars: &[char]) {
        let start = self.column;
        self.column += 1;
        let mut escape = false;
        let mut closed = false;
        let mut buf = String::new();
        while self.column < chars.len() {
            let ch = chars[self.column];
            match ch {
                '\\' if !escape => escape = true,
                '"' if !escape => {
                    closed = true;
                    self.column += 1;
                    break;
                }
                _ => {
                    buf.push(ch);
                    escape = false;
                }
            }
            self.column += 1;
        }

        if escape || !closed {
            self.token(chars, TokenKind::InvalidToken, start, Value::None);
        } else {
            self.token(chars, TokenKind::StringLiteral, start, Value::Str(buf));
        }
    }

    fn regular_token(&mut self, chars: &[char]) {
        let start = self.column;
        self.skip_to_separator(chars);
        let text: String = chars[start..self.column].iter().collect();
        let first = chars[start];
        let last = chars[self.column - 1];

        if last == ':' {
            self.token(chars, TokenKind::Label, start, Value::Str(text));
            return;
        }
        if last == 'y' || last == 'm' || last == 'd' {
            let units = &text[..text.len() - 1];
            if let Ok(n) = units.parse::<i64>() {
                let kind = match last {
                    'y' => TokenKind::YearSpanLiteral,
                    'm' => TokenKind::MonthSpanLiteral,
                    _ => TokenKind::DaySpanLiteral,
                };
                self.token(chars, kind, start, Value::Span(n));
                return;
            }
        }
        if let Ok(n) = text.parse::<i64>() {
            self.token(chars, TokenKind::IntegerLiteral, start, Value::Int(n));
            return;
        }
        if let Ok(x) = text.parse::<f64>() {
            self.token(chars, TokenKind::RealLiteral, start, Value::Real(x));
            return;
        }

        match first {
            '@' => {
                if let Some(date) = parse_date(&text[1..]) {
                    self.token(chars, TokenKind::DateLiteral, start, Value::Date(date));
                } else {
                    self.token(chars, TokenKind::InvalidToken, start, Value::None);
                }
                return;
            }
            '_' => {
                self.token(chars, TokenKind::Variable, start, Value::Str(text));
                return;
            }
            '$' => {
                let name = text[1..].to_string();
                self.token(chars, TokenKind::Input, start, Value::Str(name));
                return;
            }
            _ => {}
        }

        match text.as_str() {
            "true" => self.token(chars, TokenKind::BooleanLiteral, start, Value::Bool(true)),
            "false" => self.token(chars, TokenKind::BooleanLiteral, start, Value::Bool(false)),
            "nil" => self.token(chars, TokenKind::NilLiteral, start, Value::Nil),
            "today" => self.token(chars, TokenKind::TodayLiteral, start, Value::None),
            _ => {
                if self.last_kind == Some(TokenKind::OpenParen) {
                    self.token(chars, TokenKind::Operation, start, Value::Str(text));
                } else {
                    self.token(chars, TokenKind::CanonicalField, start, Value::Str(text));
                }
            }
        }
    }

    fn token(&mut self, chars: &[char], kind: TokenKind, start: usize, value: Value) {
        self.tokens.push(Token {
            kind,
            line: self.line,
            column: start,
            text: chars[start..self.column].iter().collect(),
            value,
        });
        if kind != TokenKind::Comment {
            self.last_kind = Some(kind);
        }
    }

    fn skip_space(&mut self, chars: &[char]) {
        while self.column < chars.len() && chars[self.column].is_whitespace() {
            self.column += 1;
        }
    }

    fn skip_to_separator(&mut self, chars: &[char]) {
        while self.column < chars.len() {
            let ch = chars[self.column];
            if ch == '(' || ch == ')' || ch == '"' || ch == ';' || ch == '#' || ch.is_whitespace() {
                return;
            }
            self.column += 1;
        }
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// The shape is checked before the calendar: a two-digit month and day are
/// required, so `2020-1-2` is rejected.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &text[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };
    let year = digits(0..4)?;
    let month = digits(5..7)?;
    let day = digits(8..10)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, line: usize, column: usize, text: &str, value: Value) -> Token {
        Token {
            kind,
            line,
            column,
            text: text.to_string(),
            value,
        }
    }

    fn lex(text: &str) -> Vec<Token> {
        let mut tokens = tokenize_str(text);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndMarker));
        tokens.pop();
        tokens
    }

    use TokenKind::*;

    // --- Punctuation and comments ---

    #[test]
    fn test_empty_input_yields_only_end_marker() {
        let tokens = tokenize_str("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, EndMarker);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 0));
    }

    #[test]
    fn test_comment_consumes_rest_of_line() {
        assert_eq!(
            lex("   # abc   "),
            vec![tok(Comment, 0, 3, "# abc   ", Value::None)]
        );
    }

    #[test]
    fn test_comment_terminates_regular_token() {
        assert_eq!(
            lex("a#c2"),
            vec![
                tok(CanonicalField, 0, 0, "a", Value::Str("a".into())),
                tok(Comment, 0, 1, "#c2", Value::None),
            ]
        );
    }

    #[test]
    fn test_nested_parens() {
        assert_eq!(
            lex(" (())"),
            vec![
                tok(OpenParen, 0, 1, "(", Value::None),
                tok(OpenParen, 0, 2, "(", Value::None),
                tok(CloseParen, 0, 3, ")", Value::None),
                tok(CloseParen, 0, 4, ")", Value::None),
            ]
        );
    }

    // --- String literals ---

    #[test]
    fn test_string_literal() {
        assert_eq!(
            lex(r#""abc""#),
            vec![tok(StringLiteral, 0, 0, r#""abc""#, Value::Str("abc".into()))]
        );
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(
            lex(r#""""#),
            vec![tok(StringLiteral, 0, 0, r#""""#, Value::Str(String::new()))]
        );
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(
            lex(r#"  "\"""#),
            vec![tok(StringLiteral, 0, 2, r#""\"""#, Value::Str("\"".into()))]
        );
    }

    #[test]
    fn test_unterminated_string_is_invalid() {
        assert_eq!(
            lex(r#""abc"#),
            vec![tok(InvalidToken, 0, 0, r#""abc"#, Value::None)]
        );
    }

    #[test]
    fn test_trailing_escape_is_invalid() {
        assert_eq!(lex(r#""\"#), vec![tok(InvalidToken, 0, 0, r#""\"#, Value::None)]);
    }

    // --- Numbers and spans ---

    #[test]
    fn test_signed_integer_with_leading_zeros() {
        assert_eq!(
            lex("  -00123  "),
            vec![tok(IntegerLiteral, 0, 2, "-00123", Value::Int(-123))]
        );
    }

    #[test]
    fn test_real_with_trailing_dot() {
        assert_eq!(
            lex("  -00123.  "),
            vec![tok(RealLiteral, 0, 2, "-00123.", Value::Real(-123.0))]
        );
    }

    #[test]
    fn test_spans() {
        assert_eq!(
            lex("1y 2m 3d"),
            vec![
                tok(YearSpanLiteral, 0, 0, "1y", Value::Span(1)),
                tok(MonthSpanLiteral, 0, 3, "2m", Value::Span(2)),
                tok(DaySpanLiteral, 0, 6, "3d", Value::Span(3)),
            ]
        );
    }

    #[test]
    fn test_negative_span() {
        assert_eq!(
            lex("-2d"),
            vec![tok(DaySpanLiteral, 0, 0, "-2d", Value::Span(-2))]
        );
    }

    #[test]
    fn test_span_with_bad_prefix_falls_through() {
        // "aged" ends in 'd' but the prefix is not an integer.
        assert_eq!(
            lex("aged"),
            vec![tok(CanonicalField, 0, 0, "aged", Value::Str("aged".into()))]
        );
    }

    // --- Dates ---

    #[test]
    fn test_date_literal() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(
            lex(" @2020-01-02 "),
            vec![tok(DateLiteral, 0, 1, "@2020-01-02", Value::Date(date))]
        );
    }

    #[test]
    fn test_short_date_is_invalid() {
        assert_eq!(
            lex("@2020-01-0 "),
            vec![tok(InvalidToken, 0, 0, "@2020-01-0", Value::None)]
        );
    }

    #[test]
    fn test_unpadded_date_is_invalid() {
        assert_eq!(
            lex("@2020-1-02"),
            vec![tok(InvalidToken, 0, 0, "@2020-1-02", Value::None)]
        );
    }

    #[test]
    fn test_impossible_date_is_invalid() {
        assert_eq!(
            lex("@2020-02-30"),
            vec![tok(InvalidToken, 0, 0, "@2020-02-30", Value::None)]
        );
    }

    // --- Names, keywords, sigils ---

    #[test]
    fn test_bare_underscore_is_a_variable() {
        assert_eq!(lex("_"), vec![tok(Variable, 0, 0, "_", Value::Str("_".into()))]);
    }

    #[test]
    fn test_variable() {
        assert_eq!(
            lex("  _abc_123_ "),
            vec![tok(Variable, 0, 2, "_abc_123_", Value::Str("_abc_123_".into()))]
        );
    }

    #[test]
    fn test_input_value_drops_sigil() {
        assert_eq!(lex("$x"), vec![tok(Input, 0, 0, "$x", Value::Str("x".into()))]);
    }

    #[test]
    fn test_label() {
        assert_eq!(
            lex("default:"),
            vec![tok(Label, 0, 0, "default:", Value::Str("default:".into()))]
        );
    }

    #[test]
    fn test_dotted_field_with_wildcards() {
        assert_eq!(
            lex(" abc.+.-.123 "),
            vec![tok(
                CanonicalField,
                0,
                1,
                "abc.+.-.123",
                Value::Str("abc.+.-.123".into())
            )]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex("today")[0].kind, TodayLiteral);
        assert_eq!(lex("nil")[0].value, Value::Nil);
        assert_eq!(lex("true")[0].value, Value::Bool(true));
        assert_eq!(lex("false")[0].value, Value::Bool(false));
    }

    // --- Context-sensitive classification ---

    #[test]
    fn test_first_token_after_open_paren_is_operation() {
        assert_eq!(
            lex("(foo bar)"),
            vec![
                tok(OpenParen, 0, 0, "(", Value::None),
                tok(Operation, 0, 1, "foo", Value::Str("foo".into())),
                tok(CanonicalField, 0, 5, "bar", Value::Str("bar".into())),
                tok(CloseParen, 0, 8, ")", Value::None),
            ]
        );
    }

    #[test]
    fn test_equal_sign_after_open_paren_is_operation() {
        assert_eq!(
            lex("a = (= bar);"),
            vec![
                tok(CanonicalField, 0, 0, "a", Value::Str("a".into())),
                tok(EqualSign, 0, 2, "=", Value::None),
                tok(OpenParen, 0, 4, "(", Value::None),
                tok(Operation, 0, 5, "=", Value::Str("=".into())),
                tok(CanonicalField, 0, 7, "bar", Value::Str("bar".into())),
                tok(CloseParen, 0, 10, ")", Value::None),
                tok(Semicolon, 0, 11, ";", Value::None),
            ]
        );
    }

    #[test]
    fn test_comment_does_not_reset_paren_context() {
        // The comment between '(' and the name must not demote the
        // operation to a canonical field.
        let tokens = lex("(#c\nfoo)");
        assert_eq!(tokens[2].kind, Operation);
    }

    #[test]
    fn test_multi_line_positions() {
        assert_eq!(
            lex("#c1\na#c2\n=#c3\n123;"),
            vec![
                tok(Comment, 0, 0, "#c1", Value::None),
                tok(CanonicalField, 1, 0, "a", Value::Str("a".into())),
                tok(Comment, 1, 1, "#c2", Value::None),
                tok(EqualSign, 2, 0, "=", Value::None),
                tok(Comment, 2, 1, "#c3", Value::None),
                tok(IntegerLiteral, 3, 0, "123", Value::Int(123)),
                tok(Semicolon, 3, 3, ";", Value::None),
            ]
        );
    }

    // --- Invariants ---

    #[test]
    fn test_tokenization_is_deterministic() {
        let source = "foo = (baz $x 1y @2020-01-02 \"s\");\n# done";
        assert_eq!(tokenize_str(source), tokenize_str(source));
    }

    #[test]
    fn test_token_text_matches_grid() {
        let source = "foo = (baz $x, 1y);\n  bar = \"a b\"; # note";
        let lines: Vec<Vec<char>> = source.split('\n').map(|l| l.chars().collect()).collect();
        for token in lex(source) {
            let grid: String = lines[token.line][token.column..token.end_column()]
                .iter()
                .collect();
            assert_eq!(grid, token.text, "mismatch for {token}");
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spans_cover_every_printable_char(source in "[ -~]{0,60}") {
                let lines: Vec<Vec<char>> =
                    source.split('\n').map(|l| l.chars().collect()).collect();
                let tokens = tokenize(&lines);
                let mut covered = vec![false; lines[0].len()];
                for token in &tokens {
                    if token.kind == TokenKind::EndMarker {
                        continue;
                    }
                    for col in token.column..token.end_column() {
                        prop_assert!(!covered[col], "overlap at {}", col);
                        covered[col] = true;
                    }
                }
                for (col, ch) in lines[0].iter().enumerate() {
                    if !ch.is_whitespace() {
                        prop_assert!(covered[col], "uncovered {:?} at {}", ch, col);
                    }
                }
            }

            #[test]
            fn deterministic(source in "[a-z0-9=;()\"#_$@. \n]{0,80}") {
                prop_assert_eq!(tokenize_str(&source), tokenize_str(&source));
            }
        }
    }
}
