//! Coercion kinds and the values they produce.

use std::fmt::{self, Write};

use serde::Serialize;
use thiserror::Error;

const TRUTHY_STRINGS: [&str; 5] = ["true", "t", "yes", "y", "1"];
const FALSY_STRINGS: [&str; 5] = ["false", "f", "no", "n", "0"];

/// How a raw argument string is turned into a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Boolean switch. Toggles when given without a value.
    Flag,
    /// Signed 64-bit integer. Values that do not parse are rejected.
    Integer,
    /// Floating point number with lenient parsing; unparsable input becomes NaN.
    Float,
    /// The raw string, unchanged.
    Text,
    /// Named marker for anything else. Behaves like `Text` during coercion.
    Custom(String),
}

impl ArgKind {
    /// Name rendered in help output, e.g. `[Boolean]`.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Flag => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Number",
            Self::Text => "String",
            Self::Custom(name) => name.as_str(),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }

    /// Coerce `raw` according to this kind.
    pub fn coerce(&self, raw: &str) -> Result<Value, ValueError> {
        match self {
            Self::Flag => parse_flag(raw).map(Value::Bool).ok_or(ValueError::NotBoolean),
            Self::Integer => raw
                .trim_matches(is_js_whitespace)
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| ValueError::NotInteger),
            Self::Float => Ok(Value::Number(parse_number(raw))),
            Self::Text | Self::Custom(_) => Ok(Value::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Why a raw value could not become a final [`Value`].
///
/// The message is written to follow the argument as it appeared on the
/// command line, e.g. `--age was provided with a value that was not an integer`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("was provided with a value that was not a boolean")]
    NotBoolean,
    #[error("was provided with a value that was not an integer")]
    NotInteger,
    #[error("was provided with a value that could not be mapped: {0}")]
    Mapping(String),
}

/// A coerced (and possibly mapped) argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Truthiness used for flag toggling and the `help` check.
    ///
    /// `false`, `0`, `NaN` and `""` are falsy; lists are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::List(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(n) => fmt_number(*n, f),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // -0 prints as 0
        f.write_char('0')
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // 1e21 => 1e+21, 1.5e-7 stays as is
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => write!(f, "{mantissa}e+{power}"),
            _ => f.write_str(&exp),
        }
    } else {
        write!(f, "{n}")
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    let lowered = raw.to_lowercase();
    if TRUTHY_STRINGS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSY_STRINGS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Lenient numeric parse.
///
/// Surrounding whitespace is ignored and an empty string is zero. Accepts
/// decimal literals with an optional exponent, a signed `Infinity`, and
/// unsigned `0x`/`0o`/`0b` integers. Anything else is NaN.
pub(crate) fn parse_number(raw: &str) -> f64 {
    let s = raw.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits.chars().fold(0.0, |acc, c| {
            acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
        });
    }

    let (sign, unsigned) = if let Some(rest) = s.strip_prefix('-') {
        (-1.0, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (1.0, rest)
    } else {
        (1.0, s)
    };

    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    unsigned
        .parse::<f64>()
        .map(|n| sign * n)
        .unwrap_or(f64::NAN)
}

/// Whitespace and line terminators as `Number()` strips them: Unicode `Zs`,
/// tab, vertical tab, form feed, BOM, and LF, CR, U+2028, U+2029.
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = digits_from(0);
    let mut i = int_end;
    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_end = digits_from(i + 1);
        frac_digits = frac_end - (i + 1);
        i = frac_end;
    }
    if int_end == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_end = digits_from(i);
        if exp_end == i {
            return false;
        }
        i = exp_end;
    }

    i == bytes.len()
}
