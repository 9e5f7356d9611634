use std::ffi::{OsStr, OsString};
use std::io::{self, Write};

use crate::error::{ParseError, SpecificationError};
use crate::help;
use crate::options::ParserOptions;
use crate::parsed::ParsedArguments;
use crate::spec::{ArgSpec, ArgumentSpec, ArgumentsSpecification, HELP};
use crate::token::{self, Token};
use crate::value::Value;

/// Result of a parse: `None` means help was printed instead.
pub type ParseResult = Result<Option<ParsedArguments>, ParseError>;

/// Parses argument lists against a fixed specification.
///
/// The specification is seeded with the built-ins from [`ParserOptions`] and
/// only changes through [`ArgumentParser::set_arguments_specification`].
/// Each parse builds a fresh [`ParsedArguments`].
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    specification: ArgumentsSpecification,
    options: ParserOptions,
}

impl ArgumentParser {
    /// Build a parser, failing if two arguments share a short name.
    pub fn new<I, K>(specs: I, options: ParserOptions) -> Result<Self, SpecificationError>
    where
        I: IntoIterator<Item = (K, ArgSpec)>,
        K: Into<String>,
    {
        let specification = ArgumentsSpecification::with_builtins(&options.builtins, specs)?;
        Ok(Self {
            specification,
            options,
        })
    }

    /// Build a parser with default [`ParserOptions`].
    pub fn with_specs<I, K>(specs: I) -> Result<Self, SpecificationError>
    where
        I: IntoIterator<Item = (K, ArgSpec)>,
        K: Into<String>,
    {
        Self::new(specs, ParserOptions::default())
    }

    /// Replace the specification. The built-ins are seeded again.
    ///
    /// On error the previous specification stays in place.
    pub fn set_arguments_specification<I, K>(&mut self, specs: I) -> Result<(), SpecificationError>
    where
        I: IntoIterator<Item = (K, ArgSpec)>,
        K: Into<String>,
    {
        self.specification = ArgumentsSpecification::with_builtins(&self.options.builtins, specs)?;
        Ok(())
    }

    pub fn arguments_specification(&self) -> &ArgumentsSpecification {
        &self.specification
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn default_arguments(&self) -> ParsedArguments {
        self.specification.default_arguments()
    }

    pub fn help_text(&self) -> String {
        help::render(&self.options.help_usage, &self.specification)
    }

    pub fn write_help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.help_text())
    }

    /// Print the help text to stdout.
    pub fn help(&self) -> io::Result<()> {
        self.write_help(&mut io::stdout().lock())
    }

    /// Parse the process arguments, skipping the program name.
    pub fn parse_env(&self) -> ParseResult {
        let args: Vec<OsString> = std::env::args_os().skip(1).collect();
        self.parse(args.as_slice())
    }

    /// Parse `args`, printing help to stdout when it is requested.
    pub fn parse<S: AsRef<OsStr>>(&self, args: &[S]) -> ParseResult {
        self.parse_to(args, &mut io::stdout().lock())
    }

    /// Parse `args`, writing help to `out` when it is requested.
    ///
    /// - no arguments (with `help_on_no_arguments`) or a truthy `help` => `Ok(None)`
    /// - unknown arguments fail unless `error_on_unknown_arguments` is off
    /// - required arguments are checked once all arguments are consumed
    pub fn parse_to<S, W>(&self, args: &[S], out: &mut W) -> ParseResult
    where
        S: AsRef<OsStr>,
        W: Write,
    {
        if self.options.help_on_no_arguments && args.is_empty() {
            tracing::debug!("no arguments given, showing help");
            self.write_help(out)?;
            return Ok(None);
        }

        let mut parsed = self.default_arguments();
        let mut tokens = Tokens::new(args);

        while !parsed.help_requested() {
            let Some(argument) = tokens.advance()? else {
                break;
            };

            match token::classify(argument) {
                Token::Short {
                    names,
                    value: Some(value),
                } => self.short_with_value(argument, names, value, &mut parsed)?,
                Token::Short { names, value: None } => {
                    self.short_group(argument, names, &mut tokens, &mut parsed)?
                }
                Token::Long {
                    name,
                    value: Some(value),
                } => self.long_with_value(argument, name, value, &mut parsed)?,
                Token::Long { name, value: None } => {
                    self.long_alone(argument, name, &mut tokens, &mut parsed)?
                }
                Token::Other => self.unknown(argument)?,
            }
        }

        if parsed.help_requested() {
            tracing::debug!("help requested");
            self.write_help(out)?;
            return Ok(None);
        }

        // Flags always carry a default, so a required flag never fails here.
        for (long_name, spec) in self.specification.iter() {
            if spec.required && !parsed.contains(long_name) {
                return Err(ParseError::invalid(
                    long_name,
                    spec,
                    format!("--{long_name} was not provided but is a required argument"),
                ));
            }
        }

        Ok(Some(parsed))
    }

    fn unknown(&self, argument: &str) -> Result<(), ParseError> {
        if self.options.error_on_unknown_arguments {
            return Err(ParseError::UnknownArgument {
                argument: argument.to_string(),
            });
        }
        tracing::debug!(argument, "skipping unknown argument");
        Ok(())
    }

    /// `-x=value`
    fn short_with_value(
        &self,
        argument: &str,
        names: &str,
        value: &str,
        parsed: &mut ParsedArguments,
    ) -> Result<(), ParseError> {
        let resolved = names
            .chars()
            .next()
            .and_then(|short| self.specification.find_by_short(short));
        let Some((long_name, spec)) = resolved else {
            return self.unknown(argument);
        };
        assign(parsed, &format!("-{names}"), long_name, spec, value)
    }

    /// `-abc`, or `-x value` for a lone non-flag.
    fn short_group<S: AsRef<OsStr>>(
        &self,
        argument: &str,
        names: &str,
        tokens: &mut Tokens<'_, S>,
        parsed: &mut ParsedArguments,
    ) -> Result<(), ParseError> {
        let grouped = names.len() > 1;

        for short in names.chars() {
            let Some((long_name, spec)) = self.specification.find_by_short(short) else {
                self.unknown(argument)?;
                continue;
            };

            if long_name == HELP {
                parsed.insert(HELP, Value::Bool(true));
            } else if spec.is_flag() {
                parsed.insert(long_name, spec.toggled());
            } else {
                if grouped {
                    return Err(ParseError::invalid(
                        long_name,
                        spec,
                        format!(
                            "-{short} was provided in a concatenated set of arguments, {argument}, but must be provided separately as it requires a corresponding argument value"
                        ),
                    ));
                }
                let Some(value) = tokens.advance()? else {
                    return Err(ParseError::invalid(
                        long_name,
                        spec,
                        format!("-{short} was provided without a corresponding argument value"),
                    ));
                };
                assign(parsed, &format!("-{short}"), long_name, spec, value)?;
            }
        }

        Ok(())
    }

    /// `--name=value`
    fn long_with_value(
        &self,
        argument: &str,
        name: &str,
        value: &str,
        parsed: &mut ParsedArguments,
    ) -> Result<(), ParseError> {
        let Some(spec) = self.specification.get(name) else {
            return self.unknown(argument);
        };
        assign(parsed, &format!("--{name}"), name, spec, value)
    }

    /// `--name`, or `--name value` for a non-flag.
    fn long_alone<S: AsRef<OsStr>>(
        &self,
        argument: &str,
        name: &str,
        tokens: &mut Tokens<'_, S>,
        parsed: &mut ParsedArguments,
    ) -> Result<(), ParseError> {
        let Some(spec) = self.specification.get(name) else {
            return self.unknown(argument);
        };

        if name == HELP {
            parsed.insert(HELP, Value::Bool(true));
        } else if spec.is_flag() {
            parsed.insert(name, spec.toggled());
        } else {
            let Some(value) = tokens.advance()? else {
                return Err(ParseError::invalid(
                    name,
                    spec,
                    format!("{argument} was provided without a corresponding argument"),
                ));
            };
            assign(parsed, &format!("--{name}"), name, spec, value)?;
        }

        Ok(())
    }
}

/// Coerce and map `raw`, then store it under `long_name`.
///
/// `display` is the argument as written (`-a`, `--age`) for error messages.
fn assign(
    parsed: &mut ParsedArguments,
    display: &str,
    long_name: &str,
    spec: &ArgumentSpec,
    raw: &str,
) -> Result<(), ParseError> {
    let value = spec
        .to_value(raw)
        .map_err(|err| ParseError::invalid(long_name, spec, format!("{display} {err}")))?;
    tracing::trace!(argument = long_name, %value, "assigned value");
    parsed.insert(long_name, value);
    Ok(())
}

/// Front cursor over the arguments being parsed.
struct Tokens<'a, S> {
    args: &'a [S],
    position: usize,
}

impl<'a, S: AsRef<OsStr>> Tokens<'a, S> {
    fn new(args: &'a [S]) -> Self {
        Self { args, position: 0 }
    }

    fn advance(&mut self) -> Result<Option<&'a str>, ParseError> {
        let Some(arg) = self.args.get(self.position) else {
            return Ok(None);
        };
        let index = self.position;
        self.position += 1;

        let arg = arg.as_ref();
        arg.to_str().map(Some).ok_or_else(|| ParseError::NotUnicode {
            index,
            lossy: arg.to_string_lossy().into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArgKind;

    fn quiet() -> ParserOptions {
        ParserOptions::default().help_on_no_arguments(false)
    }

    fn run(parser: &ArgumentParser, args: &[&str]) -> (ParseResult, String) {
        let mut out = Vec::new();
        let result = parser.parse_to(args, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn empty_input_prints_help() {
        let parser = ArgumentParser::with_specs(std::iter::empty::<(&str, ArgSpec)>()).unwrap();
        let (result, out) = run(&parser, &[]);
        assert!(result.unwrap().is_none());
        assert!(out.starts_with("Options:\n\n--help, -h"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn help_stops_consuming_arguments() {
        let parser = ArgumentParser::with_specs([("name", ArgSpec::text().required(true))]).unwrap();
        // The unknown token after --help is never looked at.
        let (result, out) = run(&parser, &["--help", "--bogus"]);
        assert!(result.unwrap().is_none());
        assert!(out.contains("--name\n[String]"));
    }

    #[test]
    fn help_in_group_still_processes_rest_of_group() {
        let parser = ArgumentParser::with_specs([("special", ArgSpec::new().short('s'))]).unwrap();
        let (result, _) = run(&parser, &["-hz"]);
        match result {
            Err(ParseError::UnknownArgument { argument }) => assert_eq!(argument, "-hz"),
            other => panic!("expected UnknownArgument, got: {other:?}"),
        }
    }

    #[test]
    fn help_with_false_value_does_not_trigger_help() {
        let parser = ArgumentParser::new(
            std::iter::empty::<(&str, ArgSpec)>(),
            quiet(),
        )
        .unwrap();
        let (result, out) = run(&parser, &["--help=no"]);
        let parsed = result.unwrap().unwrap();
        assert_eq!(parsed.get_bool(HELP), Some(false));
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_arguments_are_skipped_when_allowed() {
        let parser = ArgumentParser::new(
            [("special", ArgSpec::new().short('s')), ("name", ArgSpec::text())],
            quiet().error_on_unknown_arguments(false),
        )
        .unwrap();
        let (result, _) = run(
            &parser,
            &["positional", "-sz", "--nope", "--nope=1", "-z=1", "--name", "x"],
        );
        let parsed = result.unwrap().unwrap();
        assert_eq!(parsed.get_bool("special"), Some(true));
        assert_eq!(parsed.get_str("name"), Some("x"));
        assert!(!parsed.contains("nope"));
    }

    #[test]
    fn unknown_token_is_an_error_by_default() {
        let parser = ArgumentParser::with_specs(std::iter::empty::<(&str, ArgSpec)>()).unwrap();
        let (result, _) = run(&parser, &["file.txt"]);
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "file.txt could not be parsed as it is an unknown argument"
        );
    }

    #[test]
    fn non_flag_in_group_is_rejected() {
        let parser = ArgumentParser::with_specs([("name", ArgSpec::text().short('n'))]).unwrap();
        let (result, _) = run(&parser, &["-vn", "Ada"]);
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "-n was provided in a concatenated set of arguments, -vn, but must be provided separately as it requires a corresponding argument value"
        );
        let (long_name, spec) = err.argument().unwrap();
        assert_eq!(long_name, "name");
        assert_eq!(spec.kind, ArgKind::Text);
    }

    #[test]
    fn missing_values_are_rejected() {
        let parser = ArgumentParser::with_specs([("name", ArgSpec::text().short('n'))]).unwrap();

        let (result, _) = run(&parser, &["-n"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "-n was provided without a corresponding argument value"
        );

        let (result, _) = run(&parser, &["--name"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "--name was provided without a corresponding argument"
        );
    }

    #[test]
    fn flag_values_must_be_boolean() {
        let parser = ArgumentParser::new(std::iter::empty::<(&str, ArgSpec)>(), quiet()).unwrap();

        let (result, _) = run(&parser, &["-v=yes"]);
        assert_eq!(result.unwrap().unwrap().get_bool("verbose"), Some(true));

        let (result, _) = run(&parser, &["-v=maybe"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "-v was provided with a value that was not a boolean"
        );

        let (result, _) = run(&parser, &["--verbose=2"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "--verbose was provided with a value that was not a boolean"
        );
    }

    #[test]
    fn next_token_is_taken_verbatim_as_value() {
        let parser = ArgumentParser::with_specs([("name", ArgSpec::text().short('n'))]).unwrap();
        let (result, _) = run(&parser, &["-n", "--verbose"]);
        let parsed = result.unwrap().unwrap();
        assert_eq!(parsed.get_str("name"), Some("--verbose"));
        assert_eq!(parsed.get_bool("verbose"), Some(false));
    }

    #[test]
    fn integer_values_are_validated() {
        let parser = ArgumentParser::with_specs([("count", ArgSpec::integer().short('c'))]).unwrap();

        let (result, _) = run(&parser, &["-c", "12"]);
        assert_eq!(result.unwrap().unwrap().get_i64("count"), Some(12));

        let (result, _) = run(&parser, &["--count=1.5"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "--count was provided with a value that was not an integer"
        );
    }

    #[test]
    fn mapper_errors_become_invalid_arguments() {
        let parser = ArgumentParser::with_specs([(
            "port",
            ArgSpec::integer().try_map_value(|v| match v {
                Value::Integer(n) if (1..=65535).contains(&n) => Ok(v),
                _ => Err("out of range".to_string()),
            }),
        )])
        .unwrap();

        let (result, _) = run(&parser, &["--port=0"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "--port was provided with a value that could not be mapped: out of range"
        );
    }

    #[test]
    fn toggles_do_not_run_mappers() {
        let parser = ArgumentParser::with_specs([(
            "loud",
            ArgSpec::flag().short('l').map_value(|_| Value::from("mapped")),
        )])
        .unwrap();

        let (result, _) = run(&parser, &["-l"]);
        assert_eq!(result.unwrap().unwrap().get_bool("loud"), Some(true));

        let (result, _) = run(&parser, &["--loud=true"]);
        assert_eq!(result.unwrap().unwrap().get_str("loud"), Some("mapped"));
    }

    #[test]
    fn required_flags_are_never_missing() {
        let parser = ArgumentParser::new(
            [("force", ArgSpec::flag().required(true))],
            quiet(),
        )
        .unwrap();
        let (result, _) = run(&parser, &[]);
        assert_eq!(result.unwrap().unwrap().get_bool("force"), Some(false));
    }

    #[test]
    fn later_arguments_overwrite_earlier_ones() {
        let parser = ArgumentParser::with_specs([("name", ArgSpec::text())]).unwrap();
        let (result, _) = run(&parser, &["--name=a", "--name", "b", "-v", "-v"]);
        let parsed = result.unwrap().unwrap();
        assert_eq!(parsed.get_str("name"), Some("b"));
        // Toggling is relative to the default, so repeating does not flip back.
        assert_eq!(parsed.get_bool("verbose"), Some(true));
    }

    #[test]
    fn set_arguments_specification_keeps_previous_on_error() {
        let mut parser = ArgumentParser::with_specs([("name", ArgSpec::text().short('n'))]).unwrap();
        let err = parser
            .set_arguments_specification([("quiet", ArgSpec::new().short('h'))])
            .unwrap_err();
        assert!(matches!(err, SpecificationError::DuplicateShortName { .. }));
        assert!(parser.arguments_specification().get("name").is_some());

        parser
            .set_arguments_specification([("quiet", ArgSpec::new().short('q'))])
            .unwrap();
        let names: Vec<&str> = parser.arguments_specification().iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["help", "verbose", "quiet"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_arguments_are_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let parser = ArgumentParser::with_specs(std::iter::empty::<(&str, ArgSpec)>()).unwrap();
        let args = vec![OsString::from("-v"), OsString::from_vec(vec![0x66, 0xff])];
        let mut out = Vec::new();
        match parser.parse_to(args.as_slice(), &mut out) {
            Err(ParseError::NotUnicode { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected NotUnicode, got: {other:?}"),
        }
    }
}
