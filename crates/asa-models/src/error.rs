use std::fmt::{self, Display, Formatter};

/// A single violated constraint.
///
/// Primitive validators return this directly. The model validators attach it
/// to the path of the offending field, see [`FieldError`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("field required")]
    Missing,
    #[error("expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{value} is not in the range {min}..={max}")]
    OutOfRange { value: String, min: u64, max: u64 },
    #[error("'{value}' is not one of: {expected}")]
    InvalidChoice { value: String, expected: String },
    #[error("value is {actual} bytes when encoded in UTF-8, the limit is {max} bytes")]
    TooLong { max: usize, actual: usize },
    #[error("expected exactly {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("'{value}' is not a valid Algorand address: {reason}")]
    InvalidAddress { value: String, reason: &'static str },
    #[error("'{0}' is not valid base64")]
    InvalidBase64(String),
    #[error("'{value}' is not a valid SRI: {reason}")]
    InvalidSri { value: String, reason: String },
    #[error("'{0}' is not a valid MIME type")]
    InvalidMimeType(String),
    #[error("'{value}' is not a valid {expected} MIME type")]
    UnexpectedMimeType { value: String, expected: String },
    #[error("'{0}' is not a six digit hex color")]
    InvalidColor(String),
    #[error("'{value}' is not a valid URL: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("URL scheme '{scheme}' is not allowed, expected one of: {allowed}")]
    UnsupportedScheme { scheme: String, allowed: String },
    #[error("'{0}' is a public IPFS gateway, use an ipfs:// URL instead")]
    IpfsGateway(String),
    #[error("'{value}' does not contain '{needle}'")]
    MissingSubstring { value: String, needle: &'static str },
    #[error("'{0}' is not a valid locale identifier")]
    InvalidLocale(String),
    #[error("{0} is not a power of 10")]
    NotPowerOf10(u64),
    #[error("'{value}' is not a valid CID: {reason}")]
    InvalidCid { value: String, reason: String },
    #[error("null is not a valid property value")]
    NullProperty,
    #[error("properties are nested deeper than {max} levels")]
    TooDeep { max: usize },
    #[error("'traits' values must be strings or integers")]
    InvalidTrait,
    #[error("document has byte size {size} which is larger than limit {limit}")]
    DocumentTooLarge { size: usize, limit: usize },
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("missing discriminator, expected one of: {expected}")]
    MissingDiscriminator { expected: String },
    #[error("unsupported ARC standard '{0}'")]
    UnsupportedArc(String),
    #[error("default locale '{0}' is not in the list of locales")]
    DefaultLocaleNotListed(String),
    #[error("integrity given for locale '{0}' which is the default locale or not listed")]
    UnexpectedIntegrityLocale(String),
    #[error("metadata hash mismatch: declared {declared}, computed {computed}")]
    MetadataHashMismatch { declared: String, computed: String },
    #[error(
        "decimals in the asset parameters ({asset}) must match the decimals in the metadata \
         ({metadata})"
    )]
    DecimalsMismatch { asset: u32, metadata: u32 },
    #[error("{0}")]
    Constraint(String),
}

/// A [`ValidationError`] qualified with the path of the field it applies to,
/// e.g. `localization.integrity.es`. The path is empty for errors concerning
/// the document as a whole.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub error: ValidationError,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.path, self.error)
        }
    }
}

/// Every field error found while validating a document.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// An error concerning the whole document rather than a field.
    pub fn root(error: ValidationError) -> Self {
        Self(vec![FieldError {
            path: String::new(),
            error,
        }])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the errors reported for exactly `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0
            .iter()
            .filter(move |field| field.path == path)
            .map(|field| &field.error)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for field in &self.0 {
            write!(f, "\n  {field}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type IntoIter = std::vec::IntoIter<FieldError>;
    type Item = FieldError;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
