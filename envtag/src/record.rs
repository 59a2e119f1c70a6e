//! Records and the targets they are bound through

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::ops::ControlFlow;
use std::sync::{Mutex, RwLock, TryLockError};

use crate::binder::Binder;
use crate::source::{ProcessEnv, Source};

/// An annotated leaf field, handed to a [`FieldVisitor`].
pub struct Leaf<'a> {
    /// Field name as declared.
    pub name: &'static str,
    /// Raw directive from `#[env("...")]`.
    pub directive: &'static str,
    /// Name of the field's type, used when it is not supported.
    pub type_name: &'static str,
    /// The field's storage.
    pub value: &'a mut dyn Any,
}

/// Receives the fields of a [`Record`] in declaration order.
///
/// Returning [`ControlFlow::Break`] stops the walk.
pub trait FieldVisitor {
    /// Called for each field annotated with `#[env("...")]`.
    fn leaf(&mut self, leaf: Leaf<'_>) -> ControlFlow<()>;

    /// Called for each field annotated with `#[env(nested)]`.
    fn nested(&mut self, name: &'static str, record: &mut dyn Record) -> ControlFlow<()>;
}

/// A struct whose fields can be bound from the environment.
///
/// Normally implemented with `#[derive(Record)]`; see the crate documentation
/// for the attribute syntax.
pub trait Record {
    /// Report every annotated field to `visitor`, in declaration order.
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> ControlFlow<()>;

    /// Build `Self::default()` and bind it from the process environment.
    ///
    /// # Errors
    ///
    /// Returns every field error encountered, as a
    /// [`BindError`](crate::BindError).
    fn from_env() -> anyhow::Result<Self>
    where
        Self: Sized + Default,
    {
        Self::from_source(ProcessEnv)
    }

    /// Build `Self::default()` and bind it from `source`.
    ///
    /// # Errors
    ///
    /// Returns every field error encountered, as a
    /// [`BindError`](crate::BindError).
    fn from_source<S: Source>(source: S) -> anyhow::Result<Self>
    where
        Self: Sized + Default,
    {
        let mut record = Self::default();
        Binder::new().with_source(source).bind(&mut record)?;
        Ok(record)
    }
}

/// Something a [`Record`] can be bound through.
///
/// Only references implement this trait, so passing a record by value is
/// rejected at compile time. Interior-mutability cells are accepted as long
/// as they can be borrowed mutably without waiting.
///
/// ```rust
/// use std::sync::Mutex;
/// use envtag::Record;
///
/// #[derive(Default, Record)]
/// struct Config {
///     #[env("ENVTAG_DOC_TARGET_PORT,defVal:80")]
///     port: u16,
/// }
///
/// let mut config = Config::default();
/// envtag::bind(&mut config).unwrap();
///
/// let shared = Mutex::new(Config::default());
/// envtag::bind(&shared).unwrap();
/// ```
///
/// A record passed by value is not a target:
///
/// ```compile_fail,E0277
/// use envtag::Record;
///
/// #[derive(Default, Record)]
/// struct Config {
///     #[env("ENVTAG_DOC_TARGET_PORT,defVal:80")]
///     port: u16,
/// }
///
/// let _ = envtag::bind(Config::default());
/// ```
pub trait Target {
    /// Type name of the record behind the target.
    fn record_name(&self) -> &'static str;

    /// Run `bind` with mutable access to the record.
    ///
    /// Fails with a reason when the record cannot be borrowed mutably.
    fn access<T>(self, bind: impl FnOnce(&mut dyn Record) -> T) -> Result<T, String>;
}

impl<R: Record> Target for &mut R {
    fn record_name(&self) -> &'static str {
        type_name::<R>()
    }

    fn access<T>(self, bind: impl FnOnce(&mut dyn Record) -> T) -> Result<T, String> {
        Ok(bind(self))
    }
}

impl<R: Record> Target for &RefCell<R> {
    fn record_name(&self) -> &'static str {
        type_name::<R>()
    }

    fn access<T>(self, bind: impl FnOnce(&mut dyn Record) -> T) -> Result<T, String> {
        let mut record = self.try_borrow_mut().map_err(|error| error.to_string())?;
        Ok(bind(&mut *record))
    }
}

impl<R: Record> Target for &Mutex<R> {
    fn record_name(&self) -> &'static str {
        type_name::<R>()
    }

    fn access<T>(self, bind: impl FnOnce(&mut dyn Record) -> T) -> Result<T, String> {
        let mut record = self.try_lock().map_err(lock_error)?;
        Ok(bind(&mut *record))
    }
}

impl<R: Record> Target for &RwLock<R> {
    fn record_name(&self) -> &'static str {
        type_name::<R>()
    }

    fn access<T>(self, bind: impl FnOnce(&mut dyn Record) -> T) -> Result<T, String> {
        let mut record = self.try_write().map_err(lock_error)?;
        Ok(bind(&mut *record))
    }
}

fn lock_error<G>(error: TryLockError<G>) -> String {
    match error {
        TryLockError::Poisoned(_) => "lock poisoned by a panicked holder".to_string(),
        TryLockError::WouldBlock => "lock is held elsewhere".to_string(),
    }
}
