use std::io;

use thiserror::Error;

use crate::spec::{ArgumentSpec, ArgumentsSpecification};

/// The argument declarations themselves are inconsistent.
#[derive(Debug, Error)]
pub enum SpecificationError {
    /// Two long names declare the same short name.
    ///
    /// `specification` holds the entries accepted so far plus the offending one.
    #[error("{short_name} cannot be used as a short argument for more than one long argument")]
    DuplicateShortName {
        short_name: char,
        long_name: String,
        existing: String,
        specification: ArgumentsSpecification,
    },
}

impl SpecificationError {
    pub fn specification(&self) -> &ArgumentsSpecification {
        match self {
            Self::DuplicateShortName { specification, .. } => specification,
        }
    }
}

/// A parse failed. Parsing stops at the first error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{argument} could not be parsed as it is an unknown argument")]
    UnknownArgument { argument: String },

    /// A declared argument was misused or is missing.
    #[error("{message}")]
    InvalidArgument {
        long_name: String,
        spec: Box<ArgumentSpec>,
        message: String,
    },

    /// An argument was not valid UTF-8.
    #[error("argument {index} is not valid unicode: {lossy}")]
    NotUnicode { index: usize, lossy: String },

    #[error("failed to write help")]
    Io(#[from] io::Error),
}

impl ParseError {
    pub(crate) fn invalid(long_name: &str, spec: &ArgumentSpec, message: String) -> Self {
        Self::InvalidArgument {
            long_name: long_name.to_string(),
            spec: Box::new(spec.clone()),
            message,
        }
    }

    /// The `(long name, spec)` pair an [`ParseError::InvalidArgument`] refers to.
    pub fn argument(&self) -> Option<(&str, &ArgumentSpec)> {
        match self {
            Self::InvalidArgument {
                long_name, spec, ..
            } => Some((long_name.as_str(), spec.as_ref())),
            _ => None,
        }
    }
}
