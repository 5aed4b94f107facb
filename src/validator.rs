//! Pure value validation against a [`ParamSpec`].
//!
//! The validator is a standalone function with no request-side state: it
//! receives one spec, one raw value (or nothing), and whether absence is
//! allowed, and reports a typed failure. Failure messages are user-facing
//! response bodies; their exact wording is part of the public contract and
//! covered by tests.

use serde_json::Value;

use crate::api::{ParamSpec, ParamType};

/// Per-request validation failure.
///
/// Recovered locally into a 400 response whose body is the `Display`
/// rendering of the error.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    NotDefined { key: String },
    InvalidNumber { key: String, value: String },
    BelowMinimum { key: String, value: f64, min: f64 },
    AboveMaximum { key: String, value: f64, max: f64 },
    NotAString { key: String },
    PatternMismatch { key: String },
    LengthNotExact { key: String, length: usize },
    TooShort { key: String, min_length: usize },
    TooLong { key: String, max_length: usize },
    InvalidBoolean { key: String, value: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NotDefined { key } => write!(f, "'{key}' is not defined."),
            ValidationError::InvalidNumber { key, value } => {
                write!(f, "Invalid number type '{value}' of key {key}.")
            }
            ValidationError::BelowMinimum { key, value, min } => {
                write!(f, "'{key}' value {value} greater than {min}.")
            }
            ValidationError::AboveMaximum { key, value, max } => {
                write!(f, "'{key}' value {value} less than {max}.")
            }
            ValidationError::NotAString { key } => {
                write!(f, "Invalid type. '{key}' must be string.")
            }
            ValidationError::PatternMismatch { key } => {
                write!(f, "'{key}' is not match with RegExp patterns.")
            }
            ValidationError::LengthNotExact { key, length } => {
                write!(f, "'{key}' length must be {length} characters.")
            }
            ValidationError::TooShort { key, min_length } => {
                write!(f, "'{key}' length greater than {min_length} characters.")
            }
            ValidationError::TooLong { key, max_length } => {
                write!(f, "'{key}' length less than {max_length} characters.")
            }
            ValidationError::InvalidBoolean { key, value } => {
                write!(f, "Invalid boolean type '{value}' of key {key}.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Render a raw value the way it appears in failure messages.
fn raw_display(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric view of a raw value; `None` means not-a-number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Validate one raw value against its spec.
///
/// `omissible` marks parameters that may legally be absent (query options
/// and body parameters); absence then fails only when the spec is marked
/// required. Path arguments are validated non-omissible.
///
/// Repeated raw query keys are joined with `,` by the query parser before
/// this function sees them; that normalization is intentional, not an
/// error.
pub fn validate(
    spec: &ParamSpec,
    raw: Option<&Value>,
    omissible: bool,
) -> Result<(), ValidationError> {
    if omissible && raw.is_none() {
        if spec.required {
            return Err(ValidationError::NotDefined {
                key: spec.key.clone(),
            });
        }
        return Ok(());
    }

    match spec.ty {
        ParamType::Number => {
            let value =
                raw.and_then(as_number)
                    .ok_or_else(|| ValidationError::InvalidNumber {
                        key: spec.key.clone(),
                        value: raw_display(raw),
                    })?;
            if let Some(constraints) = &spec.validate {
                if let Some(min) = constraints.min {
                    if value < min {
                        return Err(ValidationError::BelowMinimum {
                            key: spec.key.clone(),
                            value,
                            min,
                        });
                    }
                }
                if let Some(max) = constraints.max {
                    if value > max {
                        return Err(ValidationError::AboveMaximum {
                            key: spec.key.clone(),
                            value,
                            max,
                        });
                    }
                }
            }
        }
        ParamType::String => {
            let value = match raw {
                Some(Value::String(s)) => s.as_str(),
                _ => {
                    return Err(ValidationError::NotAString {
                        key: spec.key.clone(),
                    })
                }
            };
            if let Some(constraints) = &spec.validate {
                if let Some(pattern) = &constraints.pattern {
                    if !pattern.is_match(value) {
                        return Err(ValidationError::PatternMismatch {
                            key: spec.key.clone(),
                        });
                    }
                }
                // Lengths count Unicode scalar values.
                let chars = value.chars().count();
                if let Some(length) = constraints.length {
                    if chars != length {
                        return Err(ValidationError::LengthNotExact {
                            key: spec.key.clone(),
                            length,
                        });
                    }
                }
                if let Some(min_length) = constraints.min_length {
                    if chars < min_length {
                        return Err(ValidationError::TooShort {
                            key: spec.key.clone(),
                            min_length,
                        });
                    }
                }
                if let Some(max_length) = constraints.max_length {
                    if chars > max_length {
                        return Err(ValidationError::TooLong {
                            key: spec.key.clone(),
                            max_length,
                        });
                    }
                }
            }
        }
        ParamType::Boolean => {
            let ok = match raw {
                Some(Value::Bool(_)) => true,
                Some(Value::String(s)) => {
                    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
                }
                _ => false,
            };
            if !ok {
                return Err(ValidationError::InvalidBoolean {
                    key: spec.key.clone(),
                    value: raw_display(raw),
                });
            }
        }
    }

    Ok(())
}
