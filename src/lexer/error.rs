use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}' at column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Invalid number literal '{literal}'")]
    InvalidNumber { literal: String, line: usize },
    #[error("Number literal '{literal}' has more than one decimal point")]
    MalformedNumber { literal: String, line: usize },
    #[error("Unterminated string literal")]
    UnterminatedString { line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { line, .. }
            | LexError::InvalidNumber { line, .. }
            | LexError::MalformedNumber { line, .. }
            | LexError::UnterminatedString { line } => *line,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
