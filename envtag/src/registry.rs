//! Conversion registry.
//!
//! The registry maps a field's [`TypeId`] to the function that parses the raw
//! string, validates it against the field's bounds and writes it into the
//! field. Binding a field is a map lookup; supporting a new type means
//! registering an entry.
//!
//! Three kinds of measure decide what `min`/`max` are compared against:
//!
//! | registered with              | bounds compare          | empty raw value     |
//! |------------------------------|-------------------------|---------------------|
//! | [`Registry::register`]       | nothing (bounds ignored) | field left untouched |
//! | [`Registry::register_ordered`] | the parsed value       | field left untouched |
//! | [`Registry::register_list`]  | the element count       | empty list written   |
//!
//! `String` is built in with its character count as measure and always
//! written, even when empty.

use std::any::{type_name, Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::directive::FieldPolicy;
use crate::duration;
use crate::error::{Bound, FieldError};

const LIST_SEPARATOR: char = ',';

type Parser<T> = Arc<dyn Fn(&str) -> Result<T, String> + Send + Sync>;
type Apply = Box<dyn Fn(&mut dyn Any, &str, &FieldPolicy) -> Result<Outcome, Failure> + Send + Sync>;

/// What happened to a field that converted without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Written,
    Skipped,
}

/// A conversion or validation failure, before field context is attached.
#[derive(Debug)]
pub(crate) enum Failure {
    Conversion {
        raw: String,
        reason: String,
    },
    OutOfRange {
        value: String,
        bound: Bound,
        bound_value: String,
    },
    InvalidBound {
        bound: Bound,
        bound_value: String,
        reason: String,
    },
}

impl Failure {
    pub(crate) fn into_field_error(self, field: &str, key: &str, target: &'static str) -> FieldError {
        let field = field.to_string();
        let key = key.to_string();
        match self {
            Failure::Conversion { raw, reason } => FieldError::ConversionFailed {
                field,
                key,
                raw,
                target,
                reason,
            },
            Failure::OutOfRange {
                value,
                bound,
                bound_value,
            } => FieldError::OutOfRange {
                field,
                key,
                value,
                bound,
                bound_value,
            },
            Failure::InvalidBound {
                bound,
                bound_value,
                reason,
            } => FieldError::InvalidBound {
                field,
                key,
                bound,
                bound_value,
                reason,
            },
        }
    }
}

/// Registers the scalar and the list conversion of each `FromStr` number.
macro_rules! register_numbers {
    ($registry:ident; $($ty:ty),*) => {
        $(
            $registry.register_ordered(|raw: &str| raw.parse::<$ty>());
            $registry.register_list(|raw: &str| raw.parse::<$ty>());
        )*
    };
}

pub(crate) struct Entry {
    type_name: &'static str,
    measured: bool,
    apply: Apply,
}

impl Entry {
    /// Name of the registered type.
    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Convert `raw`, validate it and write it into `slot`.
    pub(crate) fn apply(&self, slot: &mut dyn Any, raw: &str, policy: &FieldPolicy) -> Result<Outcome, Failure> {
        if policy.has_bounds() && !self.measured {
            tracing::warn!(
                key = %policy.key,
                type_name = self.type_name,
                "min/max ignored for a type without a measure"
            );
        }
        (self.apply)(slot, raw, policy)
    }
}

/// Conversions from raw strings to field types, keyed by type.
///
/// [`Registry::new`] knows every built-in type: `String`, the signed and
/// unsigned integers, `bool`, `f32`, `f64`, [`Duration`](std::time::Duration),
/// [`SignedDuration`](crate::duration::SignedDuration), and `Vec<T>` of all of
/// them except the durations.
///
/// # Example
///
/// ```rust
/// use std::net::IpAddr;
/// use envtag::Registry;
///
/// let mut registry = Registry::new();
/// registry.register(|raw: &str| raw.parse::<IpAddr>());
/// assert!(registry.supports::<IpAddr>());
/// assert!(!registry.supports::<Vec<IpAddr>>());
/// ```
pub struct Registry {
    entries: HashMap<TypeId, Entry>,
}

impl Registry {
    /// A registry with the built-in conversions.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.insert::<String>(string_entry());

        register_numbers!(registry; i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

        registry.register(parse_bool);
        registry.register_list(parse_bool);

        registry.register_ordered(duration::parse);
        registry.register_ordered(duration::parse_signed);

        registry
    }

    /// A registry without any conversion.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `T` without a measure: `min`/`max` are ignored.
    ///
    /// An empty raw value leaves the field untouched.
    pub fn register<T, E, F>(&mut self, parse: F) -> &mut Self
    where
        T: Any,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        self.insert::<T>(scalar_entry(parser(parse), None))
    }

    /// Register `T` with `min`/`max` compared against the parsed value.
    ///
    /// Bounds are parsed with the same function as the value.
    pub fn register_ordered<T, E, F>(&mut self, parse: F) -> &mut Self
    where
        T: Any + PartialOrd + fmt::Debug,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let parse = parser(parse);
        let bounds = Arc::clone(&parse);
        let check: Check<T> = Box::new(move |value: &T, policy: &FieldPolicy| {
            check_bounds(value, policy, |raw| bounds(raw))
        });
        self.insert::<T>(scalar_entry(parse, Some(check)))
    }

    /// Register `Vec<T>`, split on `,` with every element parsed by `parse`.
    ///
    /// `min`/`max` bound the number of elements. An empty raw value yields an
    /// empty list.
    pub fn register_list<T, E, F>(&mut self, parse: F) -> &mut Self
    where
        T: Any,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        self.insert::<Vec<T>>(list_entry(parser(parse)))
    }

    /// Register `T` decoded from JSON text with `serde_json`.
    #[cfg(feature = "serde")]
    pub fn register_json<T>(&mut self) -> &mut Self
    where
        T: serde::de::DeserializeOwned + Any,
    {
        self.register(|raw: &str| serde_json::from_str::<T>(raw))
    }

    /// Whether a conversion for `T` is registered.
    pub fn supports<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert<T: Any>(&mut self, entry: Entry) -> &mut Self {
        self.entries.insert(TypeId::of::<T>(), entry);
        self
    }

    /// The conversion registered for the type of `value`.
    pub(crate) fn find(&self, value: &dyn Any) -> Option<&Entry> {
        self.entries.get(&value.type_id())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.values().map(|entry| entry.type_name).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("types", &names).finish()
    }
}

type Check<T> = Box<dyn Fn(&T, &FieldPolicy) -> Result<(), Failure> + Send + Sync>;

fn parser<T, E, F>(parse: F) -> Parser<T>
where
    E: fmt::Display,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move |raw| parse(raw).map_err(|error| error.to_string()))
}

fn scalar_entry<T: Any>(parse: Parser<T>, check: Option<Check<T>>) -> Entry {
    let measured = check.is_some();
    let apply: Apply = Box::new(move |slot: &mut dyn Any, raw: &str, policy: &FieldPolicy| {
        if raw.is_empty() {
            return Ok(Outcome::Skipped);
        }
        let value = parse(raw).map_err(|reason| Failure::Conversion {
            raw: raw.to_string(),
            reason,
        })?;
        if let Some(check) = &check {
            check(&value, policy)?;
        }
        write(slot, value)
    });
    Entry {
        type_name: type_name::<T>(),
        measured,
        apply,
    }
}

fn string_entry() -> Entry {
    let apply: Apply = Box::new(|slot: &mut dyn Any, raw: &str, policy: &FieldPolicy| {
        check_bounds(&raw.chars().count(), policy, parse_length)?;
        write(slot, raw.to_string())
    });
    Entry {
        type_name: type_name::<String>(),
        measured: true,
        apply,
    }
}

fn list_entry<T: Any>(parse: Parser<T>) -> Entry {
    let apply: Apply = Box::new(move |slot: &mut dyn Any, raw: &str, policy: &FieldPolicy| {
        let values = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(LIST_SEPARATOR)
                .map(|element| {
                    parse(element).map_err(|reason| Failure::Conversion {
                        raw: element.to_string(),
                        reason,
                    })
                })
                .collect::<Result<Vec<T>, _>>()?
        };
        check_bounds(&values.len(), policy, parse_length)?;
        write(slot, values)
    });
    Entry {
        type_name: type_name::<Vec<T>>(),
        measured: true,
        apply,
    }
}

fn write<T: Any>(slot: &mut dyn Any, value: T) -> Result<Outcome, Failure> {
    match slot.downcast_mut::<T>() {
        Some(target) => {
            *target = value;
            Ok(Outcome::Written)
        }
        None => Err(Failure::Conversion {
            raw: String::new(),
            reason: format!("field storage is not {}", type_name::<T>()),
        }),
    }
}

fn check_bounds<Q, P>(measured: &Q, policy: &FieldPolicy, parse_bound: P) -> Result<(), Failure>
where
    Q: PartialOrd + fmt::Debug,
    P: Fn(&str) -> Result<Q, String>,
{
    let bounds = [
        (Bound::Min, policy.min.as_deref(), Ordering::Less),
        (Bound::Max, policy.max.as_deref(), Ordering::Greater),
    ];
    for (bound, bound_value, violation) in bounds {
        let Some(bound_value) = bound_value else {
            continue;
        };
        let limit = parse_bound(bound_value).map_err(|reason| Failure::InvalidBound {
            bound,
            bound_value: bound_value.to_string(),
            reason,
        })?;
        // Incomparable values (NaN) never satisfy a bound.
        match measured.partial_cmp(&limit) {
            Some(ordering) if ordering != violation => {}
            _ => {
                return Err(Failure::OutOfRange {
                    value: format!("{measured:?}"),
                    bound,
                    bound_value: bound_value.to_string(),
                })
            }
        }
    }
    Ok(())
}

fn parse_length(raw: &str) -> Result<usize, String> {
    raw.parse::<usize>().map_err(|error| error.to_string())
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean \"{raw}\"")),
    }
}
