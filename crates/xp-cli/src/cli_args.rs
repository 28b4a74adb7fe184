use clap::{Args, Parser, Subcommand};
use xp_converter::DEFAULT_MAX_NESTING;

#[derive(Debug, Parser)]
#[command(name = "xp-cli")]
#[command(about = "Convert Symfony XML service definitions into PHP configurator scripts")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ConvertArgs {
    /// An .xml file or a directory searched recursively for .xml files.
    pub(crate) source: String,
    /// Output directory; defaults to writing next to each source file.
    pub(crate) target: Option<String>,
    /// Print the script instead of writing it (single file sources only).
    #[arg(long = "stdout")]
    pub(crate) stdout: bool,
    /// File listing additional class names, one per line.
    #[arg(long = "known-classes")]
    pub(crate) known_classes: Option<String>,
    #[arg(long = "no-builtin-classes")]
    pub(crate) no_builtin_classes: bool,
    #[arg(long = "max-nesting", default_value_t = DEFAULT_MAX_NESTING)]
    pub(crate) max_nesting: usize,
    #[arg(short = 'v', long = "verbose")]
    pub(crate) verbose: bool,
}
