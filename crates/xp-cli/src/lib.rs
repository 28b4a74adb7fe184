use std::ffi::OsString;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xp_core::ConvertError;

mod cli_args;
mod convert;
mod error_map;
mod source_loader;

pub(crate) use cli_args::{Cli, ConvertArgs, Mode};
pub(crate) use error_map::{
    emit_error, map_cli_source_path, map_cli_source_read, map_cli_source_scan,
    map_cli_target_write,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(&error),
    }
}

fn run(cli: Cli) -> Result<i32, ConvertError> {
    match cli.command {
        Mode::Convert(args) => {
            init_tracing(args.verbose);
            convert::run_convert(args)
        }
    }
}

/// Logs go to stderr so `--stdout` output stays a clean script. `RUST_LOG`
/// wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
