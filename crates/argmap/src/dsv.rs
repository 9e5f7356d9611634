//! Delimiter-separated values, for arguments like `--skills=Budo,"Krav Maga"`.
//!
//! [`delimited`] wraps [`split_delimited`] as a [`MapValue`] so it can be
//! attached to an argument with [`crate::ArgSpec::mapper`].

use std::sync::Arc;

use thiserror::Error;

use crate::spec::MapValue;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsvOptions {
    pub delimiter: String,
    /// Strip the quotemarks from quoted fields.
    pub dequote: bool,
    /// Quotemark protecting delimiters inside a field. `None` means plain splitting.
    pub quotemark: Option<String>,
}

impl Default for DsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            dequote: true,
            quotemark: None,
        }
    }
}

impl DsvOptions {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn dequote(mut self, dequote: bool) -> Self {
        self.dequote = dequote;
        self
    }

    pub fn quotemark(mut self, quotemark: impl Into<String>) -> Self {
        self.quotemark = Some(quotemark.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DsvError {
    #[error("delimiter must not be empty")]
    EmptyDelimiter,
    #[error("Expected closing quotemark at the end of the value {0}")]
    UnexpectedClosingQuote(String),
    #[error("Expected opening quotemark at the start of the value {0}")]
    UnexpectedOpeningQuote(String),
    #[error("No closing quotemark was found for {0}")]
    UnterminatedQuote(String),
}

/// Split `values` on the configured delimiter.
///
/// With a quotemark, a field starting with it runs until the matching
/// quotemark, which must be followed by a delimiter or the end of input.
pub fn split_delimited(values: &str, options: &DsvOptions) -> Result<Vec<String>, DsvError> {
    let delimiter = options.delimiter.as_str();
    if delimiter.is_empty() {
        return Err(DsvError::EmptyDelimiter);
    }

    let Some(quotemark) = options.quotemark.as_deref().filter(|q| !q.is_empty()) else {
        return Ok(values.split(delimiter).map(str::to_string).collect());
    };

    let mut fields = Vec::new();
    let mut start = 0usize;
    let mut end = 0usize;
    let mut in_quote = false;

    while end < values.len() {
        let rest = &values[end..];
        if !in_quote && rest.starts_with(delimiter) {
            fields.push(field(&values[start..end], quotemark, options.dequote));
            end += delimiter.len();
            start = end;
        } else if rest.starts_with(quotemark) {
            if in_quote {
                let after = &rest[quotemark.len()..];
                if !after.is_empty() && !after.starts_with(delimiter) {
                    return Err(DsvError::UnexpectedClosingQuote(values[start..].to_string()));
                }
                in_quote = false;
            } else {
                if end != start {
                    return Err(DsvError::UnexpectedOpeningQuote(values[start..].to_string()));
                }
                in_quote = true;
            }
            end += quotemark.len();
        } else {
            end += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    if in_quote {
        return Err(DsvError::UnterminatedQuote(values[start..].to_string()));
    }
    fields.push(field(&values[start..], quotemark, options.dequote));

    Ok(fields)
}

fn field(raw: &str, quotemark: &str, dequote: bool) -> String {
    let quoted = raw.len() >= 2 * quotemark.len()
        && raw.starts_with(quotemark)
        && raw.ends_with(quotemark);
    if dequote && quoted {
        raw[quotemark.len()..raw.len() - quotemark.len()].to_string()
    } else {
        raw.to_string()
    }
}

/// A mapper turning a text value into a list of text fields.
///
/// Non-text values pass through unchanged.
pub fn delimited(options: DsvOptions) -> MapValue {
    Arc::new(move |value: Value| match value {
        Value::Text(text) => split_delimited(&text, &options)
            .map(|fields| Value::List(fields.into_iter().map(Value::Text).collect()))
            .map_err(|err| err.to_string()),
        other => Ok(other),
    })
}
