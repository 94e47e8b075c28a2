#![allow(dead_code)]
use std::path::Path;

use test_support::bench_cases;
use typelang::ast::Program;
use typelang::{Config, lexer, parser};

/// `(label, source, config)` for every fixture with benchmarking enabled.
pub fn workloads() -> Vec<(String, String, Config)> {
    let cases = bench_cases(Path::new("tests/programs")).expect("load bench cases");
    cases
        .into_iter()
        .map(|case| {
            let source = case.read_program().expect("read bench program");
            let config = case
                .spec
                .max_call_depth
                .map(|depth| Config::default().with_max_call_depth(depth))
                .unwrap_or_default();
            (case.name, source, config)
        })
        .collect()
}

pub fn load_program(label: &str, source: &str) -> Program {
    let tokens = lexer::tokenize(source).unwrap_or_else(|err| panic!("tokenize {label}: {err}"));
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {label}: {err}"))
}
