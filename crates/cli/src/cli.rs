use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::{convert_command, metrics_command};

#[derive(Parser, Debug)]
#[command(name = "bp2bazel")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug                 Enable debug logging\n    BP2BUILD_ERROR_UNCONVERTED=1   Fail modules with unconverted dependencies")]
pub struct Bp2Bazel {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that runs a conversion
#[derive(Args, Debug, Clone, Default)]
pub struct ConversionArgs {
    /// Path to the JSON module graph
    pub graph: PathBuf,

    /// Code-generation mode: bp2build, queryview or api_bp2build
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Treat unconverted and missing dependencies as errors
    #[arg(short, long)]
    pub strict: bool,

    /// Append a bp2build_all_srcs filegroup to every generated package
    #[arg(long)]
    pub filegroups: bool,

    /// Print every attribute on the rule's line
    #[arg(long)]
    pub inline: bool,

    /// Config file to use instead of the nearest bp2bazel.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a module graph and print the generated BUILD files
    #[command(visible_alias = "c")]
    Convert {
        #[command(flatten)]
        args: ConversionArgs,

        /// Write the BUILD files under this directory instead of printing them
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Convert a module graph and print the conversion metrics
    #[command(visible_alias = "m")]
    Metrics {
        #[command(flatten)]
        args: ConversionArgs,

        /// Print a human readable summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
}

impl Commands {
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Convert { args, out_dir } => convert_command(&args, out_dir.as_deref()),
            Commands::Metrics { args, summary } => metrics_command(&args, summary),
        }
    }
}
