//! Declarative command-line argument parsing.
//!
//! Arguments are declared by long name with an [`ArgSpec`]. [`ArgumentParser`]
//! turns a raw argument list into [`ParsedArguments`], a map from long name to
//! typed [`Value`], or prints help. Supported syntax:
//! - `--name`, `--name=value`, `--name value`
//! - `-n`, `-n=value`, `-n value`
//! - `-abc` for any number of boolean short flags
//!
//! `--help/-h` and `--verbose/-v` are always declared.
//!
//! ```
//! use argmap::{ArgSpec, ArgumentParser, ParserOptions};
//!
//! let parser = ArgumentParser::new(
//!     [
//!         ("name", ArgSpec::text().short('n').required(true)),
//!         ("age", ArgSpec::number().short('a')),
//!     ],
//!     ParserOptions::default(),
//! )?;
//!
//! let parsed = parser.parse(&["-n", "Ada", "--age=36.5", "-v"])?.expect("no help requested");
//! assert_eq!(parsed.get_str("name"), Some("Ada"));
//! assert_eq!(parsed.get_f64("age"), Some(36.5));
//! assert_eq!(parsed.get_bool("verbose"), Some(true));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dsv;
pub mod error;
pub mod help;
pub mod options;
pub mod parsed;
pub mod parser;
pub mod spec;
pub mod token;
pub mod value;

pub use error::{ParseError, SpecificationError};
pub use options::ParserOptions;
pub use parsed::ParsedArguments;
pub use parser::{ArgumentParser, ParseResult};
pub use spec::{ArgSpec, ArgumentSpec, ArgumentsSpecification, HELP, MapValue, VERBOSE, builtin_arguments};
pub use value::{ArgKind, Value, ValueError};
