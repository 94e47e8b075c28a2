use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};

use typelang::{Config, Interpreter, lexer, parser};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut config = Config::default();
    let mut dump_tokens = false;
    let mut dump_ast = false;
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-call-depth" => {
                let depth = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing depth after {arg}"))?;
                let depth = depth
                    .parse()
                    .with_context(|| format!("Invalid call depth '{depth}'"))?;
                config = config.with_max_call_depth(depth);
            }
            "--tokens" => dump_tokens = true,
            "--ast" => dump_ast = true,
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let tokens = lexer::tokenize(&source).map_err(typelang::Error::from)?;
    if dump_tokens {
        for token in &tokens {
            println!("{}:{} {}", token.span.line, token.span.column, token.kind);
        }
    }

    let program = parser::parse_tokens(tokens).map_err(typelang::Error::from)?;
    if dump_ast {
        println!("{program:#?}");
    }
    if dump_tokens || dump_ast {
        return Ok(());
    }

    let execution = Interpreter::with_config(config).run(&program);
    for event in &execution.events {
        println!("{event}");
    }
    if let Some(halt) = execution.halt {
        let location = halt
            .line
            .map(|line| format!(" on line {line}"))
            .unwrap_or_default();
        return Err(anyhow::Error::new(halt.error).context(format!("Execution halted{location}")));
    }
    Ok(())
}
