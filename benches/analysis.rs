//! Throughput of the per-keystroke analysis pipeline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use rulepad::canonical::{default_inputs, default_operations, employee_schema};
use rulepad::meta::Meta;
use rulepad::parser::Parser;
use rulepad::tokenizer::{tokenize, tokenize_str};

/// A document shaped like a real mapping-rule file: comments, calls,
/// inputs, literals, and the occasional mistake.
fn generate_document(rules: usize) -> String {
    let mut out = String::from("# generated benchmark document\n");
    for i in 0..rules {
        match i % 4 {
            0 => out.push_str(&format!("_tmp_{i} = (strip_leading_zeros $employee_id);\n")),
            1 => out.push_str(&format!(
                "custom_fields.field_{i} = (first_of $division \"none\");\n"
            )),
            2 => out.push_str(&format!(
                "dependents.+.first_name = (map $given_names limit: {i});\n"
            )),
            _ => out.push_str(&format!("benefits.-.effective_date = @2021-03-15; # {i}\n")),
        }
    }
    out
}

fn employee_parser() -> Parser {
    Parser::new(
        Meta::from_schema(&employee_schema()),
        default_inputs(),
        default_operations(),
    )
}

fn bench_tokenize(c: &mut Criterion) {
    let document = generate_document(1000);
    let lines: Vec<Vec<char>> = document.split('\n').map(|l| l.chars().collect()).collect();
    c.bench_function("tokenize_1000_rules", |b| {
        b.iter(|| tokenize(black_box(&lines)));
    });
}

fn bench_parse(c: &mut Criterion) {
    let document = generate_document(1000);
    let tokens = tokenize_str(&document);
    let parser = employee_parser();
    c.bench_function("parse_1000_rules", |b| {
        b.iter(|| parser.parse(black_box(&tokens)));
    });
}

fn bench_full_pass(c: &mut Criterion) {
    let document = generate_document(200);
    let lines: Vec<Vec<char>> = document.split('\n').map(|l| l.chars().collect()).collect();
    let parser = employee_parser();
    c.bench_function("keystroke_pass_200_rules", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&lines));
            parser.parse(&tokens)
        });
    });
}

criterion_group!(benches, bench_tokenize, bench_parse, bench_full_pass);
criterion_main!(benches);
