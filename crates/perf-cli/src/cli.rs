//! CLI argument definitions for perfload.

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "perfload",
    version,
    about = "Validate performance CSV exports and load them into destination tables",
    long_about = "Validate performance CSV exports and load them into destination tables.\n\n\
                  Each summary file lists one entity per row; the first column names the\n\
                  entity whose <DATA_DIR><id>-perform.csv detail file is ingested. Every\n\
                  detail record is fanned out into one typed row per destination table."
)]
pub struct Cli {
    /// Prefix prepended to every file name, trailing separator included.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: OsString,

    /// Summary files to process, in order.
    #[arg(value_name = "SUMMARY", required = true)]
    pub summaries: Vec<OsString>,

    /// Schema declaration (TOML). Defaults to the builtin schema.
    #[arg(long, value_name = "PATH", env = "PERFLOAD_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Write one CSV file per destination table into this directory.
    ///
    /// Without it, rows are only logged at debug level.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of detail files processed concurrently.
    #[arg(long, short = 'j', value_name = "N", default_value = "1")]
    pub jobs: NonZeroUsize,

    /// Dispatch the destination tables of each record concurrently.
    #[arg(long = "parallel-tables")]
    pub parallel_tables: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
