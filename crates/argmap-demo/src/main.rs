use std::process::ExitCode;

use anyhow::{Context, Result};
use argmap::dsv::{DsvOptions, delimited};
use argmap::{ArgSpec, ArgumentParser, ParserOptions};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let parser = build_parser()?;
    let Some(parsed) = parser.parse_env()? else {
        return Ok(());
    };

    // Installed after parsing: the level follows --verbose.
    init_tracing(parsed.get_bool("verbose") == Some(true));
    tracing::info!(arguments = parsed.len(), "parsed arguments");
    for (name, value) in parsed.iter() {
        tracing::debug!(%name, %value, "argument");
    }

    let json = serde_json::to_string_pretty(&parsed).context("failed to encode arguments")?;
    println!("{json}");
    Ok(())
}

fn build_parser() -> Result<ArgumentParser> {
    let parser = ArgumentParser::new(
        [
            (
                "name",
                ArgSpec::text()
                    .short('n')
                    .required(true)
                    .usage("Who to greet"),
            ),
            ("age", ArgSpec::number().short('a').usage("Age in years")),
            (
                "skills",
                ArgSpec::text()
                    .mapper(delimited(DsvOptions::default().quotemark("\"")))
                    .usage("Comma-separated list; quote entries containing commas"),
            ),
            ("greeting", ArgSpec::text().default_value("Hello")),
            (
                "unplugged",
                ArgSpec::flag()
                    .short('u')
                    .default_value(true)
                    .usage("Pass to plug in"),
            ),
        ],
        ParserOptions::default().help_usage("Usage: argmap-demo [OPTIONS]\n\nOptions:"),
    )?;
    Ok(parser)
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .init();
}
