//! Rule segmentation and validation.
//!
//! The parser consumes the token stream produced by the tokenizer, splits
//! it into rules, tracks header definitions and emits diagnostics. Rules
//! and diagnostics reference tokens by index and position only: token
//! vectors are regenerated on every edit, so nothing here outlives a
//! pipeline pass.

use std::collections::{HashMap, HashSet};

use crate::meta::{Kind, Meta};
use crate::tokenizer::{Token, TokenKind, Value};

/// A set of known names (inputs or operations).
pub type Set = HashSet<String>;

/// One rule, as a range of token indices.
///
/// `head..body` is the header, `body..end` the body (terminating `;`
/// included). `body` is the index of the `=` token when the rule has one;
/// a `;`-closed rule without `=` records `body` at the semicolon and an
/// EndMarker-closed one records `body == end`. `field` is the index of the
/// first header token naming the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub index: usize,
    pub head: usize,
    pub body: usize,
    pub end: usize,
    pub field: Option<usize>,
}

/// A message attached to a token position.
///
/// Positions are zero-based copies of the token's (line, column), never
/// references, because tokens are discarded each pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// The outcome of one parse pass.
#[derive(Debug, Default)]
pub struct Analysis {
    pub rules: Vec<Rule>,
    pub diagnostics: Vec<Diagnostic>,
    definitions: HashMap<String, usize>,
}

impl Analysis {
    /// The ordinal of the rule first defining `name`, if any.
    pub fn first_definition(&self, name: &str) -> Option<usize> {
        self.definitions.get(name).copied()
    }

    /// Whether `name` is defined by a rule strictly before `rule_index`.
    pub fn defined_before(&self, name: &str, rule_index: usize) -> bool {
        self.first_definition(name)
            .is_some_and(|def| def < rule_index)
    }

    /// Iterate over `(name, first defining rule ordinal)`.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, usize)> {
        self.definitions.iter().map(|(name, idx)| (name.as_str(), *idx))
    }
}

/// Segment a token stream into rules.
///
/// Total: every token before the EndMarker belongs to exactly one rule.
pub fn segment(tokens: &[Token]) -> Vec<Rule> {
    let mut rules: Vec<Rule> = Vec::new();
    let mut start = 0usize;
    let mut end = 0usize;
    let mut body: Option<usize> = None;
    let mut field: Option<usize> = None;
    let mut in_body = false;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::EndMarker => break,
            TokenKind::Semicolon => {
                end = i + 1;
                rules.push(Rule {
                    index: rules.len(),
                    head: start,
                    body: body.unwrap_or(i),
                    end,
                    field,
                });
                start = end;
                body = None;
                field = None;
                in_body = false;
            }
            TokenKind::EqualSign if !in_body => {
                body = Some(i);
                in_body = true;
                end = i + 1;
            }
            TokenKind::CanonicalField | TokenKind::Variable if !in_body => {
                if field.is_none() {
                    field = Some(i);
                }
                end = i + 1;
            }
            _ => end = i + 1,
        }
    }

    if end > start {
        rules.push(Rule {
            index: rules.len(),
            head: start,
            body: body.unwrap_or(end),
            end,
            field,
        });
    }
    rules
}

/// Validates rules against the canonical model, the input fields and the
/// operation set.
pub struct Parser {
    meta: Meta,
    inputs: Set,
    operations: Set,
}

impl Parser {
    pub fn new(meta: Meta, inputs: Set, operations: Set) -> Self {
        Self {
            meta,
            inputs,
            operations,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn inputs(&self) -> &Set {
        &self.inputs
    }

    pub fn operations(&self) -> &Set {
        &self.operations
    }

    /// Parse a token stream: segment, validate, and produce sorted,
    /// position-deduplicated diagnostics.
    pub fn parse(&self, tokens: &[Token]) -> Analysis {
        let rules = segment(tokens);

        let mut definitions: HashMap<String, usize> = HashMap::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for rule in &rules {
            if let Some(f) = rule.field {
                let name = tokens[f].text.as_str();
                definitions.entry(name.to_string()).or_insert(rule.index);
                *counts.entry(name).or_insert(0) += 1;
            }
        }

        let mut sink = Sink::default();
        for rule in &rules {
            if let Some(f) = rule.field {
                if counts[tokens[f].text.as_str()] >= 2 {
                    sink.report(
                        &tokens[f],
                        format!("Multiple definitions of '{}'", tokens[f].text),
                    );
                }
            }
        }

        let analysis_defs = &definitions;
        for rule in &rules {
            self.validate_rule(rule, tokens, analysis_defs, &mut sink);
        }

        let mut diagnostics = sink.diagnostics;
        diagnostics.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));

        Analysis {
            rules,
            diagnostics,
            definitions,
        }
    }

    fn validate_rule(
        &self,
        rule: &Rule,
        tokens: &[Token],
        definitions: &HashMap<String, usize>,
        sink: &mut Sink,
    ) {
        let toks = &tokens[rule.head..rule.end];
        if toks
            .iter()
            .all(|t| matches!(t.kind, TokenKind::Comment | TokenKind::Semicolon))
        {
            return;
        }
        if rule.head == rule.body || rule.body == rule.end {
            if let Some(t) = toks.iter().find(|t| t.kind != TokenKind::Comment) {
                sink.report(t, "Incomplete rule".to_string());
            }
            return;
        }
        if tokens[rule.body].kind != TokenKind::EqualSign {
            sink.report(&tokens[rule.body], "Missing '='".to_string());
            return;
        }
        self.validate_head(rule, tokens, sink);
        self.validate_body(rule, tokens, definitions, sink);
    }

    fn validate_head(&self, rule: &Rule, tokens: &[Token], sink: &mut Sink) {
        for i in rule.head..rule.body {
            let token = &tokens[i];
            if rule.field == Some(i) {
                if token.kind == TokenKind::CanonicalField
                    && self.meta.kind(&token.text) == Kind::Invalid
                {
                    sink.report(
                        token,
                        format!("Canonical model does not have field '{}'", token.text),
                    );
                }
                continue;
            }
            match token.kind {
                TokenKind::Comment => {}
                TokenKind::InvalidToken => {
                    sink.report(token, format!("Invalid token '{}'", token.text));
                }
                _ => sink.report(token, format!("Unexpected token '{}'", token.text)),
            }
        }
    }

    fn validate_body(
        &self,
        rule: &Rule,
        tokens: &[Token],
        definitions: &HashMap<String, usize>,
        sink: &mut Sink,
    ) {
        let defined = |name: &str| {
            definitions
                .get(name)
                .is_some_and(|&def| def < rule.index)
        };
        let mut parens: Vec<usize> = Vec::new();
        let mut body_complete = false;

        for i in rule.body + 1..rule.end {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Semicolon | TokenKind::Comment => {}
                TokenKind::CanonicalField => {
                    if self.meta.kind(&token.text) == Kind::Invalid {
                        sink.report(
                            token,
                            format!("Canonical model does not have field '{}'", token.text),
                        );
                    } else if !defined(&token.text) {
                        sink.report(
                            token,
                            format!("Canonical field '{}' is not defined", token.text),
                        );
                    } else if parens.is_empty() {
                        if body_complete {
                            sink.report(token, "Extraneous token".to_string());
                        } else {
                            body_complete = true;
                        }
                    }
                }
                TokenKind::Variable => {
                    if !defined(&token.text) {
                        sink.report(token, format!("Variable '{}' is not defined", token.text));
                    } else if parens.is_empty() {
                        if body_complete {
                            sink.report(token, "Extraneous token".to_string());
                        } else {
                            body_complete = true;
                        }
                    }
                }
                TokenKind::Operation => {
                    if !self.operations.contains(&token.text) {
                        sink.report(
                            token,
                            format!("Operation '{}' is not defined", token.text),
                        );
                    }
                }
                TokenKind::Input => {
                    let name = match &token.value {
                        Value::Str(s) => s.split(':').next().unwrap_or(""),
                        _ => "",
                    };
                    if !self.inputs.contains(name) {
                        sink.report(
                            token,
                            format!("Input field '{}' is not defined", token.text),
                        );
                    } else if parens.is_empty() {
                        if body_complete {
                            sink.report(token, "Extraneous token".to_string());
                        } else {
                            body_complete = true;
                        }
                    }
                }
                TokenKind::OpenParen => {
                    parens.push(i);
                    // Inside a call the first non-comment token must be an
                    // operation; a semicolon ends the search.
                    let mut next: Option<&Token> = None;
                    for candidate in &tokens[i + 1..rule.end] {
                        match candidate.kind {
                            TokenKind::Comment => {}
                            TokenKind::Semicolon => break,
                            _ => {
                                next = Some(candidate);
                                break;
                            }
                        }
                    }
                    match next {
                        None => sink.report(token, "Missing operation".to_string()),
                        Some(n)
                            if matches!(
                                n.kind,
                                TokenKind::OpenParen | TokenKind::CloseParen
                            ) =>
                        {
                            sink.report(token, "Missing operation".to_string());
                        }
                        Some(n) if n.kind != TokenKind::Operation => {
                            sink.report(n, "Missing operation".to_string());
                        }
                        Some(_) => {}
                    }
                }
                TokenKind::CloseParen => {
                    if parens.pop().is_none() {
                        sink.report(token, "Unbalanced ')'".to_string());
                    } else if parens.is_empty() {
                        body_complete = true;
                    }
                }
                TokenKind::EqualSign => {
                    sink.report(token, "Unexpected '='".to_string());
                }
                TokenKind::InvalidToken => {
                    sink.report(token, format!("Invalid token '{}'", token.text));
                }
                _ => {
                    if parens.is_empty() {
                        if body_complete {
                            sink.report(token, "Extraneous token".to_string());
                        } else {
                            body_complete = true;
                        }
                    }
                }
            }
        }

        for &open in &parens {
            sink.report(&tokens[open], "Unbalanced '('".to_string());
        }
    }
}

/// Collects diagnostics, dropping duplicates at an already-reported
/// (line, column); the first report wins.
#[derive(Default)]
struct Sink {
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<(usize, usize)>,
}

impl Sink {
    fn report(&mut self, token: &Token, message: String) {
        if self.seen.insert((token.line, token.column)) {
            self.diagnostics.push(Diagnostic {
                line: token.line,
                column: token.column,
                message,
            });
        }
    }
}
