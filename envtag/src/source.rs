//! Key-value sources that environment lookups are served from

use std::collections::{BTreeMap, HashMap};
use std::env;

/// A read-only lookup of variables by exact key.
///
/// Implementations must be free of side effects: the binder may look the
/// same key up more than once.
pub trait Source {
    /// Value of `key`, or `None` if it is not set.
    ///
    /// A variable that is set to the empty string returns `Some("")`.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Source for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        // An empty key or one containing '=' or NUL can never be set and
        // makes `var_os` panic on some platforms.
        if key.is_empty() || key.contains(['=', '\0']) {
            return None;
        }
        env::var_os(key).map(|value| match value.into_string() {
            Ok(value) => value,
            Err(value) => value.to_string_lossy().into_owned(),
        })
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

impl<S: std::hash::BuildHasher> Source for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Source for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Source for [(K, V)] {
    fn lookup(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(name, _)| name.as_ref() == key)
            .map(|(_, value)| value.as_ref().to_string())
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> Source for [(K, V); N] {
    fn lookup(&self, key: &str) -> Option<String> {
        self.as_slice().lookup(key)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Source for Vec<(K, V)> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.as_slice().lookup(key)
    }
}
