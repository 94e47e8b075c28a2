use thiserror::Error;

use crate::interpreter::RuntimeError;
use crate::lexer::LexError;
use crate::parser::SyntaxError;

/// Any failure of a source unit, from tokenizing through evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Lexical error on line {}: {}", .0.line(), .0)]
    Lex(#[from] LexError),
    #[error("Syntax error on line {}: {}", .0.line(), .0)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Lex(_) => "LexError",
            Error::Syntax(_) => "SyntaxError",
            Error::Runtime(error) => error.kind(),
        }
    }

    /// The message without any line prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Lex(error) => error.to_string(),
            Error::Syntax(error) => error.to_string(),
            Error::Runtime(error) => error.to_string(),
        }
    }

    /// Source line reported by the front end, if the error came from there.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lex(error) => Some(error.line()),
            Error::Syntax(error) => Some(error.line()),
            Error::Runtime(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
