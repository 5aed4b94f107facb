//! Positional argument assembly.
//!
//! Builds the ordered argument list a handler receives by combining path
//! arguments, query options, and body parameters, applying defaulting,
//! coercion, and validation in a fixed order. The first failing validation
//! short-circuits extraction; no partial result is ever returned.

use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::api::{ParamType, RouteDefinition};
use crate::router::ParamVec;
use crate::validator::{validate, ValidationError};

/// The ordered argument values for one handler invocation, plus the full
/// raw query map that always rides along as the trailing element of the
/// handler contract.
///
/// Built per request and discarded after the handler replies.
#[derive(Debug, Clone, Default)]
pub struct ExtractedArguments {
    /// Positional values: path args, then resolved query options, then
    /// body params, each in declaration order.
    pub values: Vec<Value>,
    /// Raw query map (repeated keys joined with `,`), supplied regardless
    /// of the declared options.
    pub raw_query: HashMap<String, String>,
}

/// Convert a finite float to a JSON number, preserving integers.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Coerce a validated raw string to its declared type.
fn coerce_scalar(ty: ParamType, raw: &str) -> Value {
    match ty {
        ParamType::Number => raw
            .trim()
            .parse::<f64>()
            .map(number_value)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        ParamType::Boolean => Value::Bool(raw.eq_ignore_ascii_case("true")),
        ParamType::String => Value::String(raw.to_string()),
    }
}

/// Assemble the positional argument list for one request.
///
/// Order of operations, each appending to the list:
/// 1. Path arguments — validated non-omissible, coerced to the declared
///    type.
/// 2. Query options — a missing value resolves to the default (which
///    bypasses validation); an option with neither value nor default is
///    silently omitted unless required.
/// 3. Body parameters — a missing value resolves to the default (again
///    unvalidated) or to JSON `null`; present values are validated and
///    passed through as parsed.
pub fn extract(
    def: &RouteDefinition,
    path_params: &ParamVec,
    query: &HashMap<String, String>,
    body: Option<&Value>,
) -> Result<ExtractedArguments, ValidationError> {
    let mut values = Vec::with_capacity(
        def.path_args.len() + def.query_options.len() + def.body_params.len(),
    );

    for arg in &def.path_args {
        let raw = path_params
            .iter()
            .rfind(|(key, _)| key.as_ref() == arg.key)
            .map(|(_, value)| Value::String(value.clone()));
        validate(arg, raw.as_ref(), false)?;
        match &raw {
            Some(Value::String(s)) => values.push(coerce_scalar(arg.ty, s)),
            _ => values.push(Value::Null),
        }
    }

    for option in &def.query_options {
        match query.get(&option.key) {
            Some(raw) => {
                let raw_value = Value::String(raw.clone());
                validate(option, Some(&raw_value), true)?;
                values.push(coerce_scalar(option.ty, raw));
            }
            None => match &option.default {
                Some(default) => values.push(default.clone()),
                None => {
                    // Passes unless the option is required. An unresolved
                    // optional option leaves no slot behind, shifting the
                    // positions of everything after it.
                    validate(option, None, true)?;
                }
            },
        }
    }

    for param in &def.body_params {
        match body.and_then(|b| b.get(&param.key)) {
            Some(raw) => {
                validate(param, Some(raw), true)?;
                values.push(raw.clone());
            }
            None => match &param.default {
                Some(default) => values.push(default.clone()),
                None => {
                    validate(param, None, true)?;
                    values.push(Value::Null);
                }
            },
        }
    }

    Ok(ExtractedArguments {
        values,
        raw_query: query.clone(),
    })
}
