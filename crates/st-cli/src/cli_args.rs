use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use st_api::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "st-cli")]
#[command(about = "Generate the Go signature table of a Go source tree")]
pub(crate) struct Cli {
    #[arg(short = 'o', long = "output")]
    pub(crate) output: Option<PathBuf>,
    #[arg(long = "config")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long = "goroot")]
    pub(crate) goroot: Option<PathBuf>,
    #[arg(long = "goos")]
    pub(crate) goos: Option<String>,
    #[arg(long = "goarch")]
    pub(crate) goarch: Option<String>,
    #[arg(long = "package")]
    pub(crate) package: Option<String>,
    #[arg(long = "format", value_enum, default_value_t = Format::Go)]
    pub(crate) format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Go,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Go => OutputFormat::Go,
            Format::Json => OutputFormat::Json,
        }
    }
}
