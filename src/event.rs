//! Observable record of a run.
//!
//! The interpreter never writes to stdout itself. Everything it does is
//! collected as an [`Event`]; callers render them through `Display`.

use std::fmt;

use crate::interpreter::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    VariableCreated {
        name: String,
        value: Value,
    },
    /// `name` is set when a single variable was printed.
    Printed {
        name: Option<String>,
        value: Value,
    },
    VariableNotFound {
        name: String,
    },
    FunctionRegistered {
        signature: String,
    },
    ClassRegistered {
        name: String,
    },
    MethodRegistered {
        class: String,
        signature: String,
    },
    FunctionCalled {
        name: String,
        arguments: Vec<(String, Value)>,
    },
    FunctionReturned {
        value: Value,
    },
    Warning {
        message: String,
    },
    Error {
        kind: &'static str,
        message: String,
        line: Option<usize>,
    },
}

impl Event {
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error { .. } | Event::VariableNotFound { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::VariableCreated { name, value } => {
                write!(f, "Created variable {name}: {} = {value}", value.value_type())
            }
            Event::Printed {
                name: Some(name),
                value,
            } => write!(f, "{name} ({}): {value}", value.value_type()),
            Event::Printed { name: None, value } => write!(f, "{value}"),
            Event::VariableNotFound { name } => write!(f, "Error: variable {name} not found"),
            Event::FunctionRegistered { signature } => write!(f, "Found function {signature}"),
            Event::ClassRegistered { name } => write!(f, "Found class {name}"),
            Event::MethodRegistered { class, signature } => {
                write!(f, "Found method {class}.{signature}")
            }
            Event::FunctionCalled { name, arguments } if arguments.is_empty() => {
                write!(f, "Calling {name} with no arguments")
            }
            Event::FunctionCalled { name, arguments } => {
                let rendered = arguments
                    .iter()
                    .map(|(param, value)| format!("{param} = {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Calling {name} with arguments: {rendered}")
            }
            Event::FunctionReturned { value } => {
                write!(f, "Function returned ({}): {value}", value.value_type())
            }
            Event::Warning { message } => write!(f, "Warning: {message}"),
            Event::Error {
                kind,
                message,
                line: Some(line),
            } => write!(f, "Error [{kind}] on line {line}: {message}"),
            Event::Error {
                kind,
                message,
                line: None,
            } => write!(f, "Error [{kind}]: {message}"),
        }
    }
}
