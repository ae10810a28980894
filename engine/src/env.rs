//! Environment variable access.
//!
//! Resolution reads variables through [`Environment`] so it stays a pure
//! function of its inputs: production code passes [`ProcessEnvironment`],
//! tests pass a `HashMap`.

use std::collections::HashMap;

/// Read-only view of environment variables.
pub trait Environment {
    /// Returns the value of `key`, or `None` when it is not set.
    ///
    /// A variable set to the empty string is set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
