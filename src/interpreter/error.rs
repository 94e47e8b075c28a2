use thiserror::Error;

use crate::ast::DeclaredType;

/// Typed errors produced while evaluating a program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },
    #[error("Function '{name}' expected {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Operator '{operator}' is not supported between {left} and {right}")]
    TypeMismatch {
        operator: &'static str,
        left: DeclaredType,
        right: DeclaredType,
    },
    #[error("Operator '{operator}' is not supported for {operand}")]
    UnaryTypeMismatch {
        operator: &'static str,
        operand: DeclaredType,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Cannot convert '{value}' to {target}")]
    ConversionError { value: String, target: DeclaredType },
    #[error("Integer overflow in '{operator}'")]
    IntegerOverflow { operator: &'static str },
    #[error("Call to '{name}' exceeds the maximum call depth of {limit}")]
    CallDepthExceeded { name: String, limit: usize },
    #[error("Return outside of function")]
    ReturnOutsideFunction,
}

impl RuntimeError {
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedVariable { .. } => "UndefinedVariable",
            RuntimeError::UndefinedFunction { .. } => "UndefinedFunction",
            RuntimeError::ArityMismatch { .. } => "ArityMismatch",
            RuntimeError::TypeMismatch { .. } => "TypeMismatch",
            RuntimeError::UnaryTypeMismatch { .. } => "UnaryTypeMismatch",
            RuntimeError::DivisionByZero => "DivisionByZero",
            RuntimeError::ConversionError { .. } => "ConversionError",
            RuntimeError::IntegerOverflow { .. } => "IntegerOverflow",
            RuntimeError::CallDepthExceeded { .. } => "CallDepthExceeded",
            RuntimeError::ReturnOutsideFunction => "ReturnOutsideFunction",
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
