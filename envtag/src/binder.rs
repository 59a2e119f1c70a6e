//! Resolution and binding of record fields

use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, LazyLock};

use crate::directive::{self, FieldPolicy};
use crate::error::{BindError, FieldError, FieldErrors};
use crate::record::{FieldVisitor, Leaf, Record, Target};
use crate::registry::{Outcome, Registry};
use crate::source::{ProcessEnv, Source};

static BUILTIN_REGISTRY: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// How field errors are aggregated during one bind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Policy {
    /// Bind every field and report all failures at the end.
    #[default]
    CollectAll,
    /// Stop at the first failing field. Fields after it are not touched.
    FailFast,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The variable was set, possibly to the empty string.
    Environment,
    /// The variable was absent and the directive's default was used.
    Default,
    /// The variable was absent and there is no default.
    Unset,
}

/// The raw text of a field and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub origin: Origin,
}

/// Look up the raw value of a field.
///
/// Priority order:
/// 1. The variable `policy.key`, verbatim, even when empty
/// 2. The directive's non-empty default
/// 3. [`FieldError::MissingRequired`] if the field is required
/// 4. The empty string
pub fn resolve<S: Source + ?Sized>(policy: &FieldPolicy, source: &S) -> Result<Resolved, FieldError> {
    if let Some(value) = source.lookup(&policy.key) {
        return Ok(Resolved {
            value,
            origin: Origin::Environment,
        });
    }

    if let Some(default) = policy.fallback() {
        return Ok(Resolved {
            value: default.to_string(),
            origin: Origin::Default,
        });
    }

    if policy.required {
        return Err(FieldError::missing(&policy.key));
    }

    Ok(Resolved {
        value: String::new(),
        origin: Origin::Unset,
    })
}

/// Binds records from a [`Source`] through a [`Registry`].
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use envtag::{Binder, Policy, Record};
///
/// #[derive(Debug, Default, Record)]
/// struct Config {
///     #[env("WORKERS,defVal:4,min:1")]
///     workers: u32,
///
///     #[env("NAME,required")]
///     name: String,
/// }
///
/// let source = HashMap::from([("WORKERS".to_string(), "0".to_string())]);
/// let binder = Binder::new().with_source(source).with_policy(Policy::FailFast);
///
/// let mut config = Config::default();
/// let error = binder.bind(&mut config).unwrap_err();
/// assert_eq!(error.field_errors().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct Binder<S = ProcessEnv> {
    source: S,
    registry: Arc<Registry>,
    policy: Policy,
}

impl Binder<ProcessEnv> {
    /// A binder over the process environment with the built-in registry.
    pub fn new() -> Self {
        Self {
            source: ProcessEnv,
            registry: Arc::clone(&BUILTIN_REGISTRY),
            policy: Policy::default(),
        }
    }
}

impl Default for Binder<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Source> Binder<S> {
    /// Read variables from `source` instead.
    pub fn with_source<T: Source>(self, source: T) -> Binder<T> {
        Binder {
            source,
            registry: self.registry,
            policy: self.policy,
        }
    }

    /// Convert values with `registry` instead of the built-in one.
    pub fn with_registry(mut self, registry: impl Into<Arc<Registry>>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Aggregate errors according to `policy`.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// The active aggregation policy.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The registry used for conversions.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bind every annotated field of the record behind `target`.
    ///
    /// Fields are visited depth-first in declaration order. A field that
    /// fails keeps its previous value; fields bound before it stay bound.
    ///
    /// # Errors
    ///
    /// - [`BindError::Unassignable`] if `target` cannot be borrowed mutably;
    ///   nothing is bound
    /// - [`BindError::Fields`] with every failure ([`Policy::CollectAll`]) or
    ///   the first one ([`Policy::FailFast`])
    pub fn bind<T: Target>(&self, target: T) -> Result<(), BindError> {
        let record_name = target.record_name();
        let walk = target
            .access(|record| self.walk(record))
            .map_err(|reason| {
                tracing::warn!(record = record_name, %reason, "record is not assignable");
                BindError::Unassignable {
                    target: record_name,
                    reason,
                }
            })?;

        tracing::debug!(
            record = record_name,
            bound = walk.bound,
            failed = walk.errors.len(),
            policy = ?self.policy,
            "bound record"
        );

        if walk.errors.is_empty() {
            Ok(())
        } else {
            Err(BindError::Fields(walk.errors))
        }
    }

    fn walk(&self, record: &mut dyn Record) -> Walk<'_, S> {
        let mut walk = Walk {
            binder: self,
            path: Vec::new(),
            errors: FieldErrors::new(),
            bound: 0,
        };
        let _ = record.visit_fields(&mut walk);
        walk
    }

    fn bind_leaf(&self, field: &str, leaf: Leaf<'_>, policy: &FieldPolicy) -> Result<Outcome, FieldError> {
        let Some(conversion) = self.registry.find(&*leaf.value) else {
            return Err(FieldError::UnsupportedType {
                kind: leaf.type_name,
                field: field.to_string(),
                key: policy.key.clone(),
            });
        };

        let resolved = resolve(policy, &self.source)?;
        let outcome = conversion
            .apply(leaf.value, &resolved.value, policy)
            .map_err(|failure| failure.into_field_error(field, &policy.key, conversion.type_name()))?;

        match outcome {
            Outcome::Written => {
                tracing::debug!(field = %field, key = %policy.key, origin = ?resolved.origin, "bound field");
            }
            Outcome::Skipped => {
                tracing::trace!(field = %field, key = %policy.key, "empty value, field left untouched");
            }
        }
        Ok(outcome)
    }
}

impl<S: fmt::Debug> fmt::Debug for Binder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("source", &self.source)
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish()
    }
}

/// State of one pass over a record tree.
struct Walk<'b, S> {
    binder: &'b Binder<S>,
    path: Vec<&'static str>,
    errors: FieldErrors,
    bound: usize,
}

impl<S> Walk<'_, S> {
    fn field_path(&self, name: &str) -> String {
        let mut path = self.path.join(".");
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(name);
        path
    }
}

impl<S: Source> FieldVisitor for Walk<'_, S> {
    fn leaf(&mut self, leaf: Leaf<'_>) -> ControlFlow<()> {
        let Some(policy) = directive::parse(leaf.directive) else {
            return ControlFlow::Continue(());
        };

        let field = self.field_path(leaf.name);
        match self.binder.bind_leaf(&field, leaf, &policy) {
            Ok(Outcome::Written) => {
                self.bound += 1;
                ControlFlow::Continue(())
            }
            Ok(Outcome::Skipped) => ControlFlow::Continue(()),
            Err(error) => {
                tracing::debug!(field = %field, %error, "field failed to bind");
                self.errors.push(error);
                match self.binder.policy {
                    Policy::CollectAll => ControlFlow::Continue(()),
                    Policy::FailFast => ControlFlow::Break(()),
                }
            }
        }
    }

    fn nested(&mut self, name: &'static str, record: &mut dyn Record) -> ControlFlow<()> {
        self.path.push(name);
        let flow = record.visit_fields(self);
        self.path.pop();
        flow
    }
}

/// Bind `target` from the process environment with the built-in registry,
/// collecting every field error.
///
/// ```rust
/// use envtag::Record;
///
/// #[derive(Default, Record)]
/// struct Config {
///     #[env("ENVTAG_DOC_THREADS,defVal:8")]
///     threads: usize,
/// }
///
/// let mut config = Config::default();
/// envtag::bind(&mut config).unwrap();
/// assert_eq!(config.threads, 8);
/// ```
pub fn bind<T: Target>(target: T) -> Result<(), BindError> {
    Binder::new().bind(target)
}
