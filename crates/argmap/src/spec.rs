//! Argument declarations.
//!
//! Callers describe arguments with [`ArgSpec`], where every field is optional.
//! [`ArgumentsSpecification`] normalizes those declarations into
//! [`ArgumentSpec`] entries with every field the parser relies on filled in.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SpecificationError;
use crate::parsed::ParsedArguments;
use crate::value::{ArgKind, Value, ValueError};

/// Long name of the built-in help flag.
pub const HELP: &str = "help";
/// Long name of the built-in verbose flag.
pub const VERBOSE: &str = "verbose";

/// Post-coercion transform.
///
/// Mappers must be pure; an `Err` is reported as an invalid argument.
pub type MapValue = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Caller-facing declaration of one argument.
///
/// Unset fields are filled in when the specification is normalized:
/// `kind` becomes [`ArgKind::Flag`], `required` becomes `false`, and flags
/// without a default get `false`.
#[derive(Clone, Default)]
pub struct ArgSpec {
    pub short_name: Option<char>,
    pub kind: Option<ArgKind>,
    pub required: Option<bool>,
    pub default_value: Option<Value>,
    pub map_value: Option<MapValue>,
    pub usage: Option<String>,
}

impl ArgSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag() -> Self {
        Self::new().kind(ArgKind::Flag)
    }

    pub fn text() -> Self {
        Self::new().kind(ArgKind::Text)
    }

    pub fn number() -> Self {
        Self::new().kind(ArgKind::Float)
    }

    pub fn integer() -> Self {
        Self::new().kind(ArgKind::Integer)
    }

    pub fn custom(type_name: impl Into<String>) -> Self {
        Self::new().kind(ArgKind::Custom(type_name.into()))
    }

    pub fn short(mut self, short_name: char) -> Self {
        self.short_name = Some(short_name);
        self
    }

    pub fn kind(mut self, kind: ArgKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Apply `f` to every coerced value of this argument.
    pub fn map_value<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.try_map_value(move |value| Ok(f(value)))
    }

    /// Like [`ArgSpec::map_value`], but the mapper may reject the value.
    pub fn try_map_value<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.mapper(Arc::new(f))
    }

    /// Install a shared mapper, e.g. one built by [`crate::dsv::delimited`].
    pub fn mapper(mut self, map_value: MapValue) -> Self {
        self.map_value = Some(map_value);
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    fn normalize(self) -> ArgumentSpec {
        let kind = self.kind.unwrap_or(ArgKind::Flag);
        let default_value = match self.default_value {
            None if kind.is_flag() => Some(Value::Bool(false)),
            other => other,
        };
        ArgumentSpec {
            short_name: self.short_name,
            kind,
            required: self.required.unwrap_or(false),
            default_value,
            map_value: self.map_value,
            usage: self.usage,
        }
    }
}

impl fmt::Debug for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgSpec")
            .field("short_name", &self.short_name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("map_value", &self.map_value.as_ref().map(|_| "<fn>"))
            .field("usage", &self.usage)
            .finish()
    }
}

/// A normalized argument declaration.
#[derive(Clone)]
pub struct ArgumentSpec {
    pub short_name: Option<char>,
    pub kind: ArgKind,
    pub required: bool,
    pub default_value: Option<Value>,
    pub map_value: Option<MapValue>,
    pub usage: Option<String>,
}

impl ArgumentSpec {
    pub fn is_flag(&self) -> bool {
        self.kind.is_flag()
    }

    /// Coerce `raw` to this argument's kind, then run the mapper if any.
    pub fn to_value(&self, raw: &str) -> Result<Value, ValueError> {
        let value = self.kind.coerce(raw)?;
        match &self.map_value {
            Some(map) => map(value).map_err(ValueError::Mapping),
            None => Ok(value),
        }
    }

    /// Value a flag takes when given without an explicit value.
    pub(crate) fn toggled(&self) -> Value {
        Value::Bool(!self.default_value.as_ref().is_some_and(Value::is_truthy))
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("short_name", &self.short_name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("map_value", &self.map_value.as_ref().map(|_| "<fn>"))
            .field("usage", &self.usage)
            .finish()
    }
}

/// Declarations for `--help/-h` and `--verbose/-v`.
///
/// A fresh map is built for every call so parsers never share defaults.
pub fn builtin_arguments() -> IndexMap<String, ArgSpec> {
    let mut builtins = IndexMap::new();
    builtins.insert(HELP.to_string(), ArgSpec::flag().short('h'));
    builtins.insert(VERBOSE.to_string(), ArgSpec::flag().short('v'));
    builtins
}

/// Normalized declarations keyed by long name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ArgumentsSpecification {
    entries: IndexMap<String, ArgumentSpec>,
}

impl ArgumentsSpecification {
    /// Normalize `specs` as given, without seeding any built-ins.
    ///
    /// Short names are checked for uniqueness against the entries normalized
    /// so far; the first collision fails the whole specification.
    pub fn normalize<I, K>(specs: I) -> Result<Self, SpecificationError>
    where
        I: IntoIterator<Item = (K, ArgSpec)>,
        K: Into<String>,
    {
        let mut entries: IndexMap<String, ArgumentSpec> = IndexMap::new();

        for (long_name, spec) in specs {
            let long_name = long_name.into();
            if let Some(short_name) = spec.short_name {
                let existing = entries
                    .iter()
                    .find(|(_, e)| e.short_name == Some(short_name))
                    .map(|(name, _)| name.clone());
                if let Some(existing) = existing {
                    let mut snapshot = entries;
                    snapshot.insert(long_name.clone(), spec.normalize());
                    return Err(SpecificationError::DuplicateShortName {
                        short_name,
                        long_name,
                        existing,
                        specification: Self { entries: snapshot },
                    });
                }
            }
            entries.insert(long_name, spec.normalize());
        }

        Ok(Self { entries })
    }

    /// Merge `specs` over `builtins` and normalize the result.
    ///
    /// A caller entry sharing a built-in's long name replaces it in place.
    /// `help` and `verbose` are always present, even when `builtins` omits them.
    pub fn with_builtins<I, K>(
        builtins: &IndexMap<String, ArgSpec>,
        specs: I,
    ) -> Result<Self, SpecificationError>
    where
        I: IntoIterator<Item = (K, ArgSpec)>,
        K: Into<String>,
    {
        let mut merged = builtin_arguments();
        for (long_name, spec) in builtins {
            merged.insert(long_name.clone(), spec.clone());
        }
        for (long_name, spec) in specs {
            merged.insert(long_name.into(), spec);
        }
        Self::normalize(merged)
    }

    pub fn get(&self, long_name: &str) -> Option<&ArgumentSpec> {
        self.entries.get(long_name)
    }

    /// Resolve a short name to its `(long name, spec)` pair.
    pub fn find_by_short(&self, short_name: char) -> Option<(&str, &ArgumentSpec)> {
        self.entries
            .iter()
            .find(|(_, spec)| spec.short_name == Some(short_name))
            .map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry that has a default value, mapped to that default.
    pub fn default_arguments(&self) -> ParsedArguments {
        self.entries
            .iter()
            .filter_map(|(name, spec)| {
                spec.default_value
                    .clone()
                    .map(|value| (name.clone(), value))
            })
            .collect()
    }
}
