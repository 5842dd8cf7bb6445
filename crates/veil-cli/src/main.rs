//! veil: command-line driver for the Veil OPRF.
//!
//! Each subcommand performs one protocol step on hex-encoded values and prints
//! a JSON object to stdout. Logs go to stderr.
//!
//! Usage:
//!   veil keygen
//!   veil blind [--hex] <input>
//!   veil evaluate <private_key> <blinded_element>
//!   veil finalize <blind> <evaluated_element>
//!   veil run [--hex] <input>
//!
//! `--hex` reads the input as hex, for inputs that are not UTF-8 text.

mod commands;
mod config;

use std::ffi::OsString;

use anyhow::{anyhow, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

const USAGE: &str = "usage: veil <keygen | blind [--hex] <input> | evaluate <private_key> <blinded> | finalize <blind> <evaluated> | run [--hex] <input>>";

/// Convert command-line arguments, rejecting any that are not UTF-8.
fn collect_args(args: impl IntoIterator<Item = OsString>) -> anyhow::Result<Vec<String>> {
    args.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow!("argument {arg:?} is not valid UTF-8; pass input with --hex"))
        })
        .collect()
}

fn init_tracing(config: &CliConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.log_level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::load()?;
    init_tracing(&config)?;
    debug!(?config, "configuration loaded");

    let args = collect_args(std::env::args_os().skip(1))?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        ["keygen"] => commands::keygen()?,
        ["blind", "--hex", input] => {
            commands::blind(&config, &commands::decode_hex("input", input)?)?
        }
        ["run", "--hex", input] => commands::run(&config, &commands::decode_hex("input", input)?)?,
        ["blind", input] => commands::blind(&config, input.as_bytes())?,
        ["evaluate", private_key, blinded] => commands::evaluate(private_key, blinded)?,
        ["finalize", blind, evaluated] => commands::finalize_output(blind, evaluated)?,
        ["run", input] => commands::run(&config, input.as_bytes())?,
        _ => bail!(USAGE),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
