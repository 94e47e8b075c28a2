use crate::ast::DeclaredType;

use super::{RuntimeError, RuntimeResult, Value};

/// Result of converting a value to a declared type. `warning` is set when
/// the conversion degraded instead of failing.
#[derive(Debug, PartialEq)]
pub(super) struct Coercion {
    pub(super) value: Value,
    pub(super) warning: Option<String>,
}

impl Coercion {
    fn exact(value: Value) -> Self {
        Self {
            value,
            warning: None,
        }
    }
}

/// Converts `value` to `target` through its text form. Values that already
/// have the target type pass through untouched.
pub(super) fn coerce(value: Value, target: DeclaredType) -> RuntimeResult<Coercion> {
    if value.value_type() == target {
        return Ok(Coercion::exact(value));
    }

    let rendered = value.to_string();
    let text = rendered.trim();
    let conversion_error = || RuntimeError::ConversionError {
        value: text.to_string(),
        target,
    };

    let converted = match target {
        DeclaredType::Int => {
            if let Ok(parsed) = text.parse::<i64>() {
                Value::Int(parsed)
            } else {
                let parsed = text.parse::<f64>().map_err(|_| conversion_error())?;
                let truncated = parsed.trunc();
                if !truncated.is_finite()
                    || truncated < i64::MIN as f64
                    || truncated >= i64::MAX as f64
                {
                    return Err(conversion_error());
                }
                Value::Int(truncated as i64)
            }
        }
        DeclaredType::Float => Value::Float(text.parse::<f64>().map_err(|_| conversion_error())?),
        DeclaredType::String => {
            let unquoted = text
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .unwrap_or(text);
            Value::String(unquoted.to_string())
        }
        DeclaredType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => {
                return Ok(Coercion {
                    value: Value::Bool(false),
                    warning: Some(format!("'{text}' is not a valid bool value, using false")),
                });
            }
        },
        DeclaredType::Void => Value::Void,
    };
    Ok(Coercion::exact(converted))
}
