use {
    crate::{
        Asa,
        arc3::Arc3Metadata,
        asset_params::AssetParams,
        error::{FieldError, ValidationError, ValidationErrors},
    },
    serde::Deserialize,
    serde_json::{Map, Value},
    std::str::FromStr,
    strum::VariantNames,
};

/// How JSON values are mapped onto typed fields.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ParseMode {
    /// Values must have exactly the expected JSON type.
    Strict,
    /// Numeric strings and integral floats are accepted where an integer is
    /// expected, and common spellings of booleans (`1`, `"true"`, `"no"`, ...)
    /// where a boolean is expected.
    Coercing,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mode: ParseMode,
    /// Maximum nesting depth of ARC-3 `properties`.
    pub max_properties_depth: usize,
    /// Raw document size limit (in bytes) for [`Validator`].
    pub size_limit: usize,
}

impl Config {
    pub const DEFAULT_MAX_PROPERTIES_DEPTH: usize = 32;
    pub const DEFAULT_SIZE_LIMIT: usize = 64 * 1024;

    pub fn new(mode: ParseMode) -> Self {
        Self {
            mode,
            max_properties_depth: Self::DEFAULT_MAX_PROPERTIES_DEPTH,
            size_limit: Self::DEFAULT_SIZE_LIMIT,
        }
    }
}

#[cfg(any(test, feature = "test_helpers"))]
impl Default for Config {
    fn default() -> Self {
        Self::new(ParseMode::Strict)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Collects field errors while a document is walked.
///
/// Every check reports into the context instead of returning early, so a
/// single pass yields the complete list of violations. Parsing helpers
/// return `None` when the value at the current path is invalid; the caller
/// keeps going with the remaining fields and only gives up on building the
/// value once everything has been visited.
pub struct Context<'a> {
    config: &'a Config,
    path: Vec<PathSegment>,
    errors: Vec<FieldError>,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            path: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Runs `f` with `segment` appended to the current path.
    pub fn at<T>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) if path.is_empty() => path.push_str(key),
                PathSegment::Key(key) => {
                    path.push('.');
                    path.push_str(key);
                }
                PathSegment::Index(index) => path.push_str(&format!("[{index}]")),
            }
        }
        path
    }

    pub fn report(&mut self, error: ValidationError) {
        let path = self.path();
        self.errors.push(FieldError { path, error });
    }

    /// Reports the error of a failed check and converts it into an `Option`.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Turns the walk result into the final outcome. A value is only returned
    /// if no error at all was reported.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => {
                debug_assert!(!self.errors.is_empty(), "invalid value without errors");
                tracing::debug!(errors = self.errors.len(), "document failed validation");
                Err(ValidationErrors(self.errors))
            }
        }
    }

    pub fn object<'v>(&mut self, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(object) => Some(object),
            other => {
                self.report(ValidationError::InvalidType {
                    expected: "object",
                    found: kind(other),
                });
                None
            }
        }
    }

    /// Parses the required field `key` of `object`.
    pub fn required<'v, T>(
        &mut self,
        object: &'v Map<String, Value>,
        key: &str,
        parse: impl FnOnce(&mut Self, &'v Value) -> Option<T>,
    ) -> Option<T> {
        self.at(key, |ctx| match lookup(object, key) {
            Some(value) => parse(ctx, value),
            None => {
                ctx.report(ValidationError::Missing);
                None
            }
        })
    }

    /// Parses the optional field `key` of `object`. The outer `Option` is
    /// `None` if the field is present but invalid, the inner one is `None` if
    /// the field is absent or `null`.
    pub fn optional<'v, T>(
        &mut self,
        object: &'v Map<String, Value>,
        key: &str,
        parse: impl FnOnce(&mut Self, &'v Value) -> Option<T>,
    ) -> Option<Option<T>> {
        self.at(key, |ctx| match lookup(object, key) {
            Some(value) => parse(ctx, value).map(Some),
            None => Some(None),
        })
    }

    pub fn string(&mut self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.report(ValidationError::InvalidType {
                    expected: "string",
                    found: kind(other),
                });
                None
            }
        }
    }

    /// Parses a string and runs a primitive validator over it.
    pub fn string_with(
        &mut self,
        value: &Value,
        check: impl FnOnce(&str) -> Result<&str, ValidationError>,
    ) -> Option<String> {
        let s = self.string(value)?;
        let valid = check(&s).map(|_| ());
        self.check(valid)?;
        Some(s)
    }

    /// Parses a string into `T` with its [`FromStr`] implementation.
    pub fn parse<T>(&mut self, value: &Value) -> Option<T>
    where
        T: FromStr<Err = ValidationError>,
    {
        let s = self.string(value)?;
        self.check(s.parse())
    }

    /// Parses one of the string variants of a `strum` enum.
    pub fn choice<T>(&mut self, value: &Value) -> Option<T>
    where
        T: FromStr + VariantNames,
    {
        let s = self.string(value)?;
        let choice = s.parse().map_err(|_| ValidationError::InvalidChoice {
            value: s.clone(),
            expected: T::VARIANTS.join(", "),
        });
        self.check(choice)
    }

    /// Parses an unsigned integer in `min..=max`.
    pub fn uint(&mut self, value: &Value, min: u64, max: u64) -> Option<u64> {
        let int = match (value, self.config.mode) {
            (Value::Number(n), _) if n.is_u64() => n.as_u64(),
            // Negative or wider than 64 bits.
            (Value::Number(n), _) if n.is_i64() || !n.is_f64() => {
                self.report(ValidationError::OutOfRange {
                    value: n.to_string(),
                    min,
                    max,
                });
                return None;
            }
            (Value::Number(n), ParseMode::Coercing) => n.as_f64().and_then(integral),
            (Value::String(s), ParseMode::Coercing) => {
                s.trim().parse::<u64>().ok().or_else(|| {
                    let float = s.trim().parse::<f64>().ok()?;
                    integral(float)
                })
            }
            _ => None,
        };
        let Some(int) = int else {
            self.report(ValidationError::InvalidType {
                expected: "unsigned 64-bit integer",
                found: kind(value),
            });
            return None;
        };
        if !(min..=max).contains(&int) {
            self.report(ValidationError::OutOfRange {
                value: int.to_string(),
                min,
                max,
            });
            return None;
        }
        Some(int)
    }

    pub fn boolean(&mut self, value: &Value) -> Option<bool> {
        let boolean = match (value, self.config.mode) {
            (Value::Bool(b), _) => Some(*b),
            (Value::Number(n), ParseMode::Coercing) => match n.as_f64().and_then(integral) {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            (Value::String(s), ParseMode::Coercing) => match s.to_lowercase().as_str() {
                "0" | "off" | "f" | "false" | "n" | "no" => Some(false),
                "1" | "on" | "t" | "true" | "y" | "yes" => Some(true),
                _ => None,
            },
            _ => None,
        };
        if boolean.is_none() {
            self.report(ValidationError::InvalidType {
                expected: "boolean",
                found: kind(value),
            });
        }
        boolean
    }

    /// Parses every item of an array, reporting errors for all bad items.
    pub fn list<T>(
        &mut self,
        value: &Value,
        mut item: impl FnMut(&mut Self, &Value) -> Option<T>,
    ) -> Option<Vec<T>> {
        let Value::Array(items) = value else {
            self.report(ValidationError::InvalidType {
                expected: "array",
                found: kind(value),
            });
            return None;
        };
        let mut parsed = Vec::with_capacity(items.len());
        for (index, value) in items.iter().enumerate() {
            parsed.push(self.at(index, |ctx| item(ctx, value)));
        }
        parsed.into_iter().collect()
    }
}

/// `null` is treated the same as an absent field.
fn lookup<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn integral(float: f64) -> Option<u64> {
    // `u64::MAX as f64` rounds up to 2^64, hence the strict comparison.
    (float.fract() == 0.0 && (0.0..18_446_744_073_709_551_616.0).contains(&float))
        .then_some(float as u64)
}

/// The JSON type name of `value` for error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses and validates raw JSON documents.
#[derive(Clone, Debug)]
pub struct Validator {
    config: Config,
}

#[cfg(any(test, feature = "test_helpers"))]
impl Default for Validator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Validator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates a JSON encoded set of asset parameters.
    pub fn asset_params(&self, document: &[u8]) -> Result<AssetParams, ValidationErrors> {
        self.validate(document, AssetParams::validate_in)
    }

    /// Validates a JSON encoded ARC-3 metadata document.
    pub fn arc3_metadata(&self, document: &[u8]) -> Result<Arc3Metadata, ValidationErrors> {
        self.validate(document, Arc3Metadata::validate_in)
    }

    /// Validates a JSON encoded ASA, i.e. asset parameters together with
    /// optional metadata.
    pub fn asa(&self, document: &[u8]) -> Result<Asa, ValidationErrors> {
        self.validate(document, Asa::validate_in)
    }

    /// Valid documents are:
    /// 1. Below or equal to [`Config::size_limit`] in size.
    /// 2. Valid JSON.
    /// 3. Accepted by `walk`.
    fn validate<T>(
        &self,
        document: &[u8],
        walk: impl FnOnce(&mut Context, &Value) -> Option<T>,
    ) -> Result<T, ValidationErrors> {
        if document.len() > self.config.size_limit {
            return Err(ValidationErrors::root(ValidationError::DocumentTooLarge {
                size: document.len(),
                limit: self.config.size_limit,
            }));
        }
        let value = serde_json::from_slice::<Value>(document)
            .map_err(|err| ValidationErrors::root(ValidationError::InvalidJson(err.to_string())))?;
        let mut ctx = Context::new(&self.config);
        let validated = walk(&mut ctx, &value);
        ctx.finish(validated)
    }
}
