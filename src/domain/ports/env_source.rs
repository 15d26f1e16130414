//! Injectable reader for process environment variables.
//!
//! The resolver and environment loaders never touch `std::env` directly, so
//! tests can supply deterministic fixtures without mutating process state.

use std::collections::HashMap;

/// Read-only view of the environment.
pub trait EnvSource {
    /// Value of a single variable, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// All variables. Sorted by key so that scans are deterministic.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort();
        vars
    }
}

/// Fixed set of variables, for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticEnv {
    values: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.sort();
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_env_lookup() {
        let env = StaticEnv::new().set("FOO", "bar");
        assert_eq!(env.var("FOO").as_deref(), Some("bar"));
        assert_eq!(env.var("MISSING"), None);
    }

    #[test]
    fn test_vars_sorted() {
        let env = StaticEnv::new().set("B", "2").set("A", "1");
        let keys: Vec<String> = env.vars().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn test_process_env_reads_real_vars() {
        temp_env::with_var("KMSCONFIG_TEST_PROBE", Some("set"), || {
            assert_eq!(ProcessEnv.var("KMSCONFIG_TEST_PROBE").as_deref(), Some("set"));
        });
    }
}
