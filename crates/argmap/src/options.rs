use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::spec::{ArgSpec, builtin_arguments};

/// Parser configuration.
///
/// Serializable so hosts can keep it next to their own settings; the
/// built-in argument declarations are not serialized and are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParserOptions {
    /// First line of the help text.
    pub help_usage: String,
    /// Print help and return no result when no arguments are given.
    pub help_on_no_arguments: bool,
    /// Fail on unknown arguments instead of skipping them.
    pub error_on_unknown_arguments: bool,
    /// Declarations every specification is seeded with (`help`, `verbose`).
    #[serde(skip)]
    pub builtins: IndexMap<String, ArgSpec>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            help_usage: "Options:".to_string(),
            help_on_no_arguments: true,
            error_on_unknown_arguments: true,
            builtins: builtin_arguments(),
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn help_usage(mut self, help_usage: impl Into<String>) -> Self {
        self.help_usage = help_usage.into();
        self
    }

    pub fn help_on_no_arguments(mut self, enabled: bool) -> Self {
        self.help_on_no_arguments = enabled;
        self
    }

    pub fn error_on_unknown_arguments(mut self, enabled: bool) -> Self {
        self.error_on_unknown_arguments = enabled;
        self
    }

    /// Add or replace a built-in declaration.
    pub fn builtin(mut self, long_name: impl Into<String>, spec: ArgSpec) -> Self {
        self.builtins.insert(long_name.into(), spec);
        self
    }
}
