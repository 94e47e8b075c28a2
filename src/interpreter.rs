use crate::ast::{FunctionDef, Program, Spanned, Statement};
use crate::config::Config;
use crate::event::Event;
use crate::token::TokenKind;

mod coerce;
mod context;
mod error;
mod runtime;
mod value;

pub use context::ClassRecord;
pub use error::{RuntimeError, RuntimeResult};
pub use value::Value;

use context::Context;
use runtime::Evaluator;

/// The error that stopped a run and the line of the statement that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct Halt {
    pub error: crate::Error,
    pub line: Option<usize>,
}

/// Everything a run produced. `halt` is set when a statement failed and the
/// rest of the top level was skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Execution {
    pub events: Vec<Event>,
    pub halt: Option<Halt>,
}

impl Execution {
    pub fn is_success(&self) -> bool {
        self.halt.is_none()
    }

    /// One rendered event per line.
    pub fn output(&self) -> String {
        self.events
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// AST-walking interpreter. Variables and definitions persist across calls to
/// [`Interpreter::run`] and [`Interpreter::execute_lines`].
pub struct Interpreter {
    context: Context,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            context: Context::new(config),
        }
    }

    /// Registers the program's top-level definitions, then executes the
    /// remaining top-level statements in order until the first error.
    pub fn run(&mut self, program: &Program) -> Execution {
        // Execution pipeline:
        // run -> register definitions -> exec_statement (top level)
        // -> eval_expression -> call_function -> exec_block (function body).
        let halt = self.execute_program(program, 0).err();
        Execution {
            events: self.context.take_events(),
            halt,
        }
    }

    /// Entry point for front ends that already split the source into
    /// statement lines. Lines are grouped until their braces balance, so a
    /// definition or block may span several entries; each group is compiled
    /// and executed against the same context. Line numbers are the 1-based
    /// indices into `lines`.
    pub fn execute_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Execution {
        let mut halt = None;
        let mut group: Vec<&str> = Vec::new();
        let mut group_start = 0;
        let mut depth = 0i64;

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if group.is_empty() {
                group_start = index;
            }
            group.push(line);
            depth += brace_balance(line);

            // A closing brace followed by an `else` line still belongs to the `if`.
            let continues = lines
                .get(index + 1)
                .is_some_and(|next| next.as_ref().trim_start().starts_with("else"));
            if depth > 0 || (continues && line.contains('}')) {
                continue;
            }
            depth = 0;
            if let Err(stop) = self.execute_source(&group.join("\n"), group_start) {
                halt = Some(stop);
                break;
            }
            group.clear();
        }

        // Whatever is left never closed its braces; compiling it reports where.
        if halt.is_none() && !group.is_empty() {
            halt = self.execute_source(&group.join("\n"), group_start).err();
        }
        Execution {
            events: self.context.take_events(),
            halt,
        }
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.context.global(name)
    }

    pub fn frame_depth(&self) -> usize {
        self.context.frame_depth()
    }

    pub fn function(&self, name: &str) -> Option<std::rc::Rc<FunctionDef>> {
        self.context.function(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.context.class(name)
    }

    pub fn config(&self) -> Config {
        self.context.config
    }

    /// Compiles a group of lines whose first line sits `line_offset` lines
    /// into the caller's input, and executes it.
    fn execute_source(&mut self, source: &str, line_offset: usize) -> Result<(), Halt> {
        match crate::compile(source) {
            Ok(program) => self.execute_program(&program, line_offset),
            Err(error) => {
                let line = error.line().map(|line| line + line_offset);
                Err(self.halt(error, line))
            }
        }
    }

    /// `line_offset` is added to every line recorded by the front end.
    fn execute_program(&mut self, program: &Program, line_offset: usize) -> Result<(), Halt> {
        for diagnostic in &program.diagnostics {
            self.context.emit(Event::Error {
                kind: "SyntaxError",
                message: diagnostic.to_string(),
                line: Some(diagnostic.line() + line_offset),
            });
        }

        for statement in &program.statements {
            match &statement.node {
                Statement::FunctionDef(function) => self.context.define_function(function),
                Statement::ClassDef(class) => self.context.define_class(class),
                _ => {}
            }
        }

        for Spanned { node, line: source_line } in &program.statements {
            if matches!(node, Statement::FunctionDef(_) | Statement::ClassDef(_)) {
                continue;
            }
            if let Err(error) = Evaluator::new(&mut self.context).exec_statement(node) {
                return Err(self.halt(error.into(), Some(source_line + line_offset)));
            }
        }
        Ok(())
    }

    fn halt(&mut self, error: crate::Error, line: Option<usize>) -> Halt {
        let line = line.or(error.line());
        self.context.emit(Event::Error {
            kind: error.kind(),
            message: error.message(),
            line,
        });
        Halt { error, line }
    }
}

/// Opening minus closing braces on one line. Braces inside string literals do
/// not count; a line that does not tokenize counts as balanced so that
/// compiling its group reports the error.
fn brace_balance(line: &str) -> i64 {
    crate::lexer::tokenize(line).map_or(0, |tokens| {
        tokens
            .iter()
            .map(|token| match token.kind {
                TokenKind::LBrace => 1,
                TokenKind::RBrace => -1,
                _ => 0,
            })
            .sum()
    })
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
