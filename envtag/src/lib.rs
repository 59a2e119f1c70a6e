//! Annotation-driven binding of environment variables into structs
//!
//! `envtag` fills the fields of an existing struct from environment
//! variables. Each field carries a directive naming the variable, whether it
//! is required, a default and optional bounds:
//!
//! ```text
//! key[,required][,defVal:<value>][,min:<value>][,max:<value>]
//! ```
//!
//! # Features
//!
//! - **Declarative**: `#[derive(Record)]` with `#[env("...")]` on each field
//! - **In place**: binds into a record you own; unset optional fields keep their value
//! - **Nested records**: `#[env(nested)]` descends into sub-structs
//! - **Bounds**: `min`/`max` on numbers and durations, on string length and list length
//! - **All errors at once**: every failing field is reported, or only the first with [`Policy::FailFast`]
//! - **Extensible**: register conversions for your own types in a [`Registry`]
//!
//! # Supported Types
//!
//! - `String`
//! - `i8`, `i16`, `i32`, `i64`, `isize`, `u8`, `u16`, `u32`, `u64`, `usize`
//! - `bool`: `1 t T TRUE true True` / `0 f F FALSE false False`
//! - `f32`, `f64`
//! - [`std::time::Duration`]: `300ms`, `1.5h`, `2h45m`, or plain seconds `30` (see [`duration`])
//! - [`SignedDuration`]: the same grammar with an optional leading `-`, e.g. `-5s`
//! - `Vec<T>` of all of the above except the durations, comma separated: `a,b,c`
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use envtag::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct Config {
//!     #[env("DOC_DATABASE_URL,required")]
//!     database_url: String,
//!
//!     #[env("DOC_PORT,defVal:8080,min:1024")]
//!     port: u16,
//!
//!     #[env("DOC_TIMEOUT,defVal:30s,max:5m")]
//!     timeout: Duration,
//!
//!     #[env("DOC_TAGS")]
//!     tags: Vec<String>,
//!
//!     #[env(nested)]
//!     cache: Cache,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct Cache {
//!     #[env("DOC_CACHE_SIZE,defVal:128")]
//!     size: usize,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! #     std::env::set_var("DOC_DATABASE_URL", "postgres://localhost/db");
//! #     std::env::set_var("DOC_TAGS", "api,v2");
//! let mut config = Config::default();
//! envtag::bind(&mut config)?;
//!
//! assert_eq!(config.database_url, "postgres://localhost/db");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.timeout, Duration::from_secs(30));
//! assert_eq!(config.tags, ["api", "v2"]);
//! assert_eq!(config.cache.size, 128);
//! #     Ok(())
//! # }
//! ```
//!
//! # Resolution
//!
//! 1. The variable, verbatim, if it is set (even to the empty string)
//! 2. The `defVal`, if it is non-empty
//! 3. A [`FieldError::MissingRequired`] error if the field is `required`
//! 4. Otherwise the empty string: strings and lists are set to empty, every
//!    other type keeps its current value
//!
//! # Errors
//!
//! [`bind`] returns [`BindError::Fields`] holding every [`FieldError`] of the
//! walk. A failing field keeps its previous value and does not stop its
//! siblings. Binding through a `RefCell`, `Mutex` or `RwLock` that cannot be
//! borrowed right now fails with [`BindError::Unassignable`] before any field
//! is touched.

mod binder;
pub mod directive;
pub mod duration;
mod error;
mod record;
mod registry;
mod source;

pub use binder::{bind, resolve, Binder, Origin, Policy, Resolved};
pub use directive::FieldPolicy;
pub use duration::SignedDuration;
pub use envtag_derive::Record;
pub use error::{BindError, Bound, FieldError, FieldErrors};
pub use record::{FieldVisitor, Leaf, Record, Target};
pub use registry::{parse_bool, Registry};
pub use source::{ProcessEnv, Source};

// Re-export for `Record::from_env` callers
#[doc(hidden)]
pub use anyhow;
