use http::Method;
use regex::Regex;
use serde_json::Value;

/// Declared type of a single API parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::String => write!(f, "string"),
            ParamType::Number => write!(f, "number"),
            ParamType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Validation constraints attached to a [`ParamSpec`].
///
/// Numeric specs use `min`/`max` (both inclusive); string specs use
/// `pattern`, `length`, `min_length` and `max_length` (both inclusive).
/// Constraints that do not apply to the declared type are ignored.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

impl Constraints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Declarative description of one argument: key, type, and how its value
/// is resolved and validated.
///
/// Created once at route registration and never mutated afterwards. When
/// `default` is set, a missing value resolves to the default *without*
/// validation — defaults bypass constraints by design.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter identifier; unique within one parameter list.
    pub key: String,
    /// Declared value type.
    pub ty: ParamType,
    /// Absence is an error for omissible parameters when set.
    pub required: bool,
    /// Value used when the request does not supply one.
    pub default: Option<Value>,
    /// Optional validation constraints.
    pub validate: Option<Constraints>,
    /// Path-template encoding override: `true` renders the argument as a
    /// bare `:key` segment, `false` as a `key/:key` pair. Unset means
    /// bare for the first argument and keyed for the rest.
    pub subset: Option<bool>,
}

impl ParamSpec {
    #[must_use]
    pub fn new(key: &str, ty: ParamType) -> Self {
        Self {
            key: key.to_string(),
            ty,
            required: false,
            default: None,
            validate: None,
            subset: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn validate(mut self, constraints: Constraints) -> Self {
        self.validate = Some(constraints);
        self
    }

    #[must_use]
    pub fn subset(mut self, subset: bool) -> Self {
        self.subset = Some(subset);
        self
    }
}

/// Compression method for archive responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMethod {
    Deflate,
    Store,
}

impl std::fmt::Display for ArchiveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveMethod::Deflate => write!(f, "DEFLATE"),
            ArchiveMethod::Store => write!(f, "STORE"),
        }
    }
}

/// Key mapping from handler-returned records to archive entries.
#[derive(Debug, Clone)]
pub struct ContainFiles {
    /// Record key holding the entry file name (default `"fileName"`).
    pub file_name_key: String,
    /// Record key holding the entry payload (default `"data"`).
    pub data_key: String,
    /// Record key holding the entry timestamp; unset means the time of
    /// formatting.
    pub time_stamp_key: Option<String>,
}

impl Default for ContainFiles {
    fn default() -> Self {
        Self {
            file_name_key: "fileName".to_string(),
            data_key: "data".to_string(),
            time_stamp_key: None,
        }
    }
}

/// Archive compression tuning; unset fields fall back to the documented
/// defaults when the settings are resolved.
#[derive(Debug, Clone, Default)]
pub struct CompressionConfig {
    /// WHATWG encoding label for entry file names (default `"us-ascii"`).
    pub file_name_encoding: Option<String>,
    /// Compression method (default DEFLATE).
    pub method: Option<ArchiveMethod>,
    /// Compression level (default 9).
    pub level: Option<i64>,
}

/// Declared response behavior for one route.
#[derive(Debug, Clone, Default)]
pub struct ResponseConfig {
    /// Declared content type; selects the formatter strategy. No Accept
    /// header negotiation is performed.
    pub content_type: Option<String>,
    /// Archive container key mapping (`application/zip` responses).
    pub contain_files: Option<ContainFiles>,
    /// Archive compression settings (`application/zip` responses).
    pub compression: Option<CompressionConfig>,
}

impl ResponseConfig {
    #[must_use]
    pub fn json() -> Self {
        Self::content_type("application/json")
    }

    #[must_use]
    pub fn content_type(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            ..Self::default()
        }
    }
}

/// Immutable description of one API operation, owned by the routing table
/// for the life of the process.
///
/// Positional argument order seen by the handler: `path_args` in
/// declaration order, then `query_options` in declaration order, then
/// `body_params` in declaration order. Query options that resolve neither
/// a value nor a default are *omitted* from the positional list, which
/// shifts everything after them — handlers with several optional options
/// must be written expecting that. Body params always occupy their slot
/// (absent resolves to JSON `null`).
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub method: Method,
    /// Route name; becomes the first path segment.
    pub name: String,
    pub path_args: Vec<ParamSpec>,
    pub query_options: Vec<ParamSpec>,
    pub body_params: Vec<ParamSpec>,
    pub response: ResponseConfig,
}

impl RouteDefinition {
    #[must_use]
    pub fn new(method: Method, name: &str) -> Self {
        Self {
            method,
            name: name.to_string(),
            path_args: Vec::new(),
            query_options: Vec::new(),
            body_params: Vec::new(),
            response: ResponseConfig::default(),
        }
    }

    #[must_use]
    pub fn path_args(mut self, args: Vec<ParamSpec>) -> Self {
        self.path_args = args;
        self
    }

    #[must_use]
    pub fn query_options(mut self, options: Vec<ParamSpec>) -> Self {
        self.query_options = options;
        self
    }

    #[must_use]
    pub fn body_params(mut self, params: Vec<ParamSpec>) -> Self {
        self.body_params = params;
        self
    }

    #[must_use]
    pub fn response(mut self, response: ResponseConfig) -> Self {
        self.response = response;
        self
    }
}

/// A registered route: the definition plus everything derived from it
/// eagerly at registration time.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub def: RouteDefinition,
    /// Name the handler coroutine is registered under in the dispatcher.
    pub handler_name: String,
    /// Full path template including the API prefix, e.g.
    /// `/api/v1/items/:id/detail/:detail`.
    pub path_template: String,
    /// Whether the request body is parsed before extraction (POST/PUT).
    pub parse_body: bool,
}
