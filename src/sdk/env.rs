//! Environment variable access for the runtime session.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

/// Read and write access to environment variables.
///
/// The session writes through this trait so tests can run against an
/// in-memory map instead of the process environment.
pub trait EnvStore: Send {
    fn get(&self, key: &str) -> Option<OsString>;
    fn set(&mut self, key: &str, value: &OsStr);
    fn remove(&mut self, key: &str);
}

/// The environment of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }

    fn set(&mut self, key: &str, value: &OsStr) {
        std::env::set_var(key, value);
    }

    fn remove(&mut self, key: &str) {
        std::env::remove_var(key);
    }
}

/// An in-memory environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: HashMap<String, OsString>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Value of `key` as a string, if set and valid UTF-8.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(|v| v.to_str())
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &OsStr) {
        self.vars.insert(key.to_string(), value.to_os_string());
    }

    fn remove(&mut self, key: &str) {
        self.vars.remove(key);
    }
}
