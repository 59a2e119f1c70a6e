//! Parsing of field directives.
//!
//! A directive is the string carried by `#[env("...")]`:
//!
//! ```text
//! key[,required][,defVal:<value>][,min:<value>][,max:<value>]
//! ```
//!
//! Tokens are separated by `,` and compared byte-for-byte. The first token is
//! the lookup key; the remaining ones are modifiers in any order. The first
//! occurrence of each prefix wins and unknown tokens are ignored.

const SEPARATOR: char = ',';
const REQUIRED: &str = "required";
const DEFAULT_PREFIX: &str = "defVal:";
const MIN_PREFIX: &str = "min:";
const MAX_PREFIX: &str = "max:";

/// Binding directives for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPolicy {
    /// Environment variable looked up for the field.
    pub key: String,

    /// Fail with [`FieldError::MissingRequired`](crate::FieldError::MissingRequired)
    /// when the variable is absent and no default is given.
    pub required: bool,

    /// Fallback used when the variable is absent.
    ///
    /// An empty default (`defVal:`) behaves as no default at all.
    pub default: Option<String>,

    /// Lower bound, inclusive.
    pub min: Option<String>,

    /// Upper bound, inclusive.
    pub max: Option<String>,
}

impl FieldPolicy {
    /// Policy for `key` with no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// The default value, if one is set and non-empty.
    pub fn fallback(&self) -> Option<&str> {
        self.default.as_deref().filter(|value| !value.is_empty())
    }

    /// Whether the policy carries any bound.
    pub fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Parse a raw directive into a [`FieldPolicy`].
///
/// Returns `None` for an empty directive: such a field is skipped entirely.
///
/// # Example
///
/// ```rust
/// use envtag::directive;
///
/// let policy = directive::parse("PORT,required,defVal:8080,min:1").unwrap();
/// assert_eq!(policy.key, "PORT");
/// assert!(policy.required);
/// assert_eq!(policy.default.as_deref(), Some("8080"));
/// assert_eq!(policy.min.as_deref(), Some("1"));
/// assert_eq!(policy.max, None);
///
/// assert!(directive::parse("").is_none());
/// ```
pub fn parse(raw: &str) -> Option<FieldPolicy> {
    if raw.is_empty() {
        return None;
    }

    let mut tokens = raw.split(SEPARATOR);
    let mut policy = FieldPolicy::new(tokens.next().unwrap_or_default());

    for token in tokens {
        if token == REQUIRED {
            policy.required = true;
        } else if let Some(value) = token.strip_prefix(DEFAULT_PREFIX) {
            policy.default.get_or_insert_with(|| value.to_string());
        } else if let Some(value) = token.strip_prefix(MIN_PREFIX) {
            policy.min.get_or_insert_with(|| value.to_string());
        } else if let Some(value) = token.strip_prefix(MAX_PREFIX) {
            policy.max.get_or_insert_with(|| value.to_string());
        } else {
            tracing::trace!(directive = raw, token, "ignoring unknown directive token");
        }
    }

    Some(policy)
}
