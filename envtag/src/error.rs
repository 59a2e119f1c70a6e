//! Error types for binding environment variables into records

use std::fmt;

/// Which bound a value was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `min:<value>`
    Min,
    /// `max:<value>`
    Max,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min => f.write_str("min"),
            Bound::Max => f.write_str("max"),
        }
    }
}

/// A failure to bind a single field.
///
/// Field errors are recoverable: under [`Policy::CollectAll`](crate::Policy::CollectAll)
/// one failing field does not stop its siblings from being bound, and a failing
/// field always keeps the value it had before binding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The variable is absent, the field is `required` and has no default.
    #[error("Required env parameter {key} not filled")]
    MissingRequired {
        /// Name of the missing environment variable
        key: String,
    },

    /// The raw value could not be parsed as the field's type.
    ///
    /// For list fields `raw` is the offending element.
    #[error("Failed to convert '{raw}' from env parameter {key} into {target} for field {field}: {reason}")]
    ConversionFailed {
        /// Path of the field inside the record (e.g. `block.port`)
        field: String,
        /// Environment variable the value came from
        key: String,
        /// Text that failed to parse
        raw: String,
        /// Name of the type parsing was attempted for
        target: &'static str,
        /// Message from the parser
        reason: String,
    },

    /// No conversion is registered for the field's type.
    #[error("Unsupported type: {kind}, field: {field}, env: {key}")]
    UnsupportedType {
        /// Name of the unsupported type
        kind: &'static str,
        /// Path of the field inside the record
        field: String,
        /// Environment variable named by the directive
        key: String,
    },

    /// The parsed value lies outside `min`/`max`.
    #[error("Value {value} of field {field} (env: {key}) violates {bound}:{bound_value}")]
    OutOfRange {
        /// Path of the field inside the record
        field: String,
        /// Environment variable the value came from
        key: String,
        /// The measured quantity: the value itself, or a length
        value: String,
        /// Which bound was violated
        bound: Bound,
        /// The bound as written in the directive
        bound_value: String,
    },

    /// A `min`/`max` bound is not valid for the field's type.
    #[error("Invalid {bound}:{bound_value} for field {field} (env: {key}): {reason}")]
    InvalidBound {
        /// Path of the field inside the record
        field: String,
        /// Environment variable named by the directive
        key: String,
        /// Which bound is malformed
        bound: Bound,
        /// The bound as written in the directive
        bound_value: String,
        /// Message from the parser
        reason: String,
    },
}

impl FieldError {
    /// Environment variable the error refers to.
    pub fn key(&self) -> &str {
        match self {
            FieldError::MissingRequired { key }
            | FieldError::ConversionFailed { key, .. }
            | FieldError::UnsupportedType { key, .. }
            | FieldError::OutOfRange { key, .. }
            | FieldError::InvalidBound { key, .. } => key,
        }
    }

    /// Create a missing variable error
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingRequired { key: key.into() }
    }
}

/// Field errors collected during one bind, in walk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the errors in walk order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// The collected errors.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

/// Errors returned by [`Binder::bind`](crate::Binder::bind).
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The target cannot be borrowed mutably; no field was touched.
    #[error("Unmutable structure {target}: {reason}")]
    Unassignable {
        /// Type name of the record behind the target
        target: &'static str,
        /// Why the record could not be borrowed
        reason: String,
    },

    /// One or more fields failed to bind.
    #[error("{0}")]
    Fields(FieldErrors),
}

impl BindError {
    /// The field errors, or `None` for an unassignable target.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            BindError::Fields(errors) => Some(errors),
            BindError::Unassignable { .. } => None,
        }
    }
}
