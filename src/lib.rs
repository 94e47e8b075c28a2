pub mod ast;
pub mod config;
pub mod error;
pub mod event;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;

pub use config::Config;
pub use error::{Error, Result};
pub use event::Event;
pub use interpreter::{Execution, Halt, Interpreter, Value};

/// Tokenizes and parses a source unit.
pub fn compile(source: &str) -> Result<ast::Program> {
    let tokens = lexer::tokenize(source)?;
    Ok(parser::parse_tokens(tokens)?)
}

/// Compiles `source` and runs it on a fresh interpreter.
pub fn run_source(source: &str, config: Config) -> Result<Execution> {
    let program = compile(source)?;
    Ok(Interpreter::with_config(config).run(&program))
}
