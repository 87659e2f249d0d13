//! Context-sensitive completion.
//!
//! Given a cursor position, produce a sorted, prefix-filtered candidate
//! list. The kind of candidates depends on where the cursor sits: inside a
//! rule header (canonical fields not yet defined), inside a call (operation
//! names), or elsewhere in a body (inputs and previously defined names).
//!
//! The engine is data-in/data-out: the returned [`CompletionList`] carries
//! the prefix it was filtered by, and applying a candidate strips it.

use crate::parser::{Analysis, Parser, Rule};
use crate::tokenizer::{Token, TokenKind};

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub kind: TokenKind,
}

/// The candidates for one cursor position.
#[derive(Debug, Clone, Default)]
pub struct CompletionList {
    items: Vec<Candidate>,
    prefix: String,
}

impl CompletionList {
    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The text to insert for the candidate at `index`: its name with the
    /// already-typed prefix removed.
    pub fn apply(&self, index: usize) -> Option<String> {
        self.items.get(index).map(|candidate| {
            candidate
                .name
                .strip_prefix(self.prefix.as_str())
                .unwrap_or(&candidate.name)
                .to_string()
        })
    }
}

/// Compute completions for the cursor at `(line, column)`.
pub fn completions_at(
    parser: &Parser,
    analysis: &Analysis,
    tokens: &[Token],
    line: usize,
    column: usize,
) -> CompletionList {
    let Some(rule) = locate(&analysis.rules, tokens, line, column) else {
        // Past the document: header candidates for a rule yet to be typed.
        return head_list(parser, analysis, analysis.rules.len(), String::new());
    };

    let in_head = tokens[rule.body].after(line, column);
    let (kind, prefix) = current_token(tokens, rule, line, column);

    if in_head {
        return head_list(parser, analysis, rule.index, prefix);
    }
    body_list(parser, analysis, rule, kind, prefix)
}

/// The rule the cursor belongs to: the first rule whose last token ends
/// strictly after the cursor. A trailing rule not closed by `;` absorbs
/// every position after it.
fn locate<'a>(
    rules: &'a [Rule],
    tokens: &[Token],
    line: usize,
    column: usize,
) -> Option<&'a Rule> {
    for rule in rules {
        let last = &tokens[rule.end - 1];
        if last.line > line || (last.line == line && last.end_column() > column) {
            return Some(rule);
        }
    }
    rules
        .last()
        .filter(|rule| tokens[rule.end - 1].kind != TokenKind::Semicolon)
}

/// The last non-comment token starting strictly before the cursor, reduced
/// to (kind, typed prefix). A token not containing the cursor contributes
/// no prefix and counts as invalid for candidate selection.
fn current_token(tokens: &[Token], rule: &Rule, line: usize, column: usize) -> (TokenKind, String) {
    let mut current: Option<&Token> = None;
    for token in &tokens[rule.head..rule.end] {
        if token.kind == TokenKind::Comment {
            continue;
        }
        if token.line < line || (token.line == line && token.column < column) {
            current = Some(token);
        } else {
            break;
        }
    }
    let Some(token) = current else {
        return (TokenKind::InvalidToken, String::new());
    };
    let contains = token.line == line && column > token.column && column <= token.end_column();
    if contains {
        let prefix: String = token.text.chars().take(column - token.column).collect();
        (token.kind, prefix)
    } else {
        (TokenKind::InvalidToken, String::new())
    }
}

/// All canonical paths minus names already defined by rules before
/// `rule_index`.
fn head_list(
    parser: &Parser,
    analysis: &Analysis,
    rule_index: usize,
    prefix: String,
) -> CompletionList {
    let items = parser
        .meta()
        .paths()
        .filter(|path| !analysis.defined_before(path, rule_index))
        .map(|path| Candidate {
            name: path.to_string(),
            kind: TokenKind::CanonicalField,
        });
    finish(items.collect(), prefix, false)
}

fn body_list(
    parser: &Parser,
    analysis: &Analysis,
    rule: &Rule,
    kind: TokenKind,
    mut prefix: String,
) -> CompletionList {
    let items: Vec<Candidate> = match kind {
        TokenKind::OpenParen | TokenKind::Operation => {
            if kind == TokenKind::OpenParen {
                prefix.clear();
            }
            parser
                .operations()
                .iter()
                .map(|name| Candidate {
                    name: name.clone(),
                    kind: TokenKind::Operation,
                })
                .collect()
        }
        _ => {
            let inputs = parser.inputs().iter().map(|name| Candidate {
                name: format!("${name}"),
                kind: TokenKind::Input,
            });
            let defined = analysis
                .definitions()
                .filter(|(_, def)| *def < rule.index)
                .map(|(name, _)| Candidate {
                    name: name.to_string(),
                    kind: if name.starts_with('_') {
                        TokenKind::Variable
                    } else {
                        TokenKind::CanonicalField
                    },
                });
            inputs.chain(defined).collect()
        }
    };
    finish(items, prefix, true)
}

fn finish(mut items: Vec<Candidate>, prefix: String, body: bool) -> CompletionList {
    if !(prefix.is_empty() || prefix == "=") {
        items.retain(|candidate| candidate.name.starts_with(&prefix));
    }
    if body {
        items.sort_by_key(|candidate| sigil_suffixed(&candidate.name));
    } else {
        items.sort_by(|a, b| a.name.cmp(&b.name));
    }
    CompletionList { items, prefix }
}

/// Sort key moving a leading `$`/`_` sigil to the end of the name, so plain
/// canonical-field candidates group first.
fn sigil_suffixed(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(sigil @ ('$' | '_')) => {
            let mut key: String = chars.collect();
            key.push(sigil);
            key
        }
        _ => name.to_string(),
    }
}
