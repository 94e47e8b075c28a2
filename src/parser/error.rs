use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("Unknown type '{name}'")]
    UnknownType { name: String, line: usize },
    #[error("Parameter '{param}' needs a type annotation (name: type)")]
    MissingParameterType { param: String, line: usize },
    #[error("Function '{name}' needs a return type (-> type)")]
    MissingReturnType { name: String, line: usize },
    #[error("Variable '{name}' cannot be declared void")]
    VoidVariable { name: String, line: usize },
    #[error("Block is missing its closing '}}'")]
    UnterminatedBlock { line: usize },
    #[error("Expression or block nested more than {limit} levels deep")]
    NestingTooDeep { limit: usize, line: usize },
    #[error("'{construct}' statements are not supported")]
    Unsupported {
        construct: &'static str,
        line: usize,
    },
}

impl SyntaxError {
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { line, .. }
            | SyntaxError::UnknownType { line, .. }
            | SyntaxError::MissingParameterType { line, .. }
            | SyntaxError::MissingReturnType { line, .. }
            | SyntaxError::VoidVariable { line, .. }
            | SyntaxError::UnterminatedBlock { line }
            | SyntaxError::NestingTooDeep { line, .. }
            | SyntaxError::Unsupported { line, .. } => *line,
        }
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;
