use std::collections::HashSet;

use http::Method;

use super::types::{ParamSpec, RouteDefinition};

/// Fatal route-registration failure.
///
/// Raised while the routing table is being built; startup must abort.
/// These are never surfaced per request and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The declared HTTP method has no handler chain.
    UnsupportedMethod(String),
    /// A parameter key appears twice within one parameter list.
    DuplicateKey { list: &'static str, key: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnsupportedMethod(method) => {
                write!(f, "Unsupported method '{method}'")
            }
            ConfigError::DuplicateKey { list, key } => {
                write!(f, "Duplicate {list} key '{key}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Build the path template for a route: the route name followed by one
/// segment group per path argument.
///
/// Encoding per argument at index `i`:
/// - `subset == Some(false)` — keyed form, `key/:key`
/// - `subset == Some(true)` — value-only form, `:key`
/// - unset — value-only for the first argument, keyed for the rest
///
/// The result is deterministic and cached on the route entry for the life
/// of the route. Malformed specs are a caller contract violation.
#[must_use]
pub fn build_path_template(name: &str, path_args: &[ParamSpec]) -> String {
    let mut template = format!("/{name}");
    for (index, arg) in path_args.iter().enumerate() {
        let only_value = match arg.subset {
            Some(subset) => subset,
            None => index == 0,
        };
        if only_value {
            template.push_str(&format!("/:{}", arg.key));
        } else {
            template.push_str(&format!("/{key}/:{key}", key = arg.key));
        }
    }
    template
}

/// Normalize the declared method to the method the route is registered
/// under, rejecting methods without a handler chain.
///
/// HEAD shares the GET chain. PATCH and OPTIONS are deliberately
/// unsupported; declaring them fails registration.
pub fn registration_method(method: &Method) -> Result<Method, ConfigError> {
    if *method == Method::GET || *method == Method::HEAD {
        Ok(Method::GET)
    } else if *method == Method::POST {
        Ok(Method::POST)
    } else if *method == Method::PUT {
        Ok(Method::PUT)
    } else if *method == Method::DELETE {
        Ok(Method::DELETE)
    } else {
        Err(ConfigError::UnsupportedMethod(method.to_string()))
    }
}

/// Check the per-list key-uniqueness invariant of a route definition.
pub fn check_unique_keys(def: &RouteDefinition) -> Result<(), ConfigError> {
    for (list, specs) in [
        ("path argument", &def.path_args),
        ("query option", &def.query_options),
        ("body parameter", &def.body_params),
    ] {
        let mut seen = HashSet::new();
        for spec in specs {
            if !seen.insert(spec.key.as_str()) {
                return Err(ConfigError::DuplicateKey {
                    list,
                    key: spec.key.clone(),
                });
            }
        }
    }
    Ok(())
}
