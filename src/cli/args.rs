//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Portico static site build pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (searched upward from the current directory)
    #[arg(short = 'C', long, global = true, default_value = "portico.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site into the destination directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Build arguments; each one overrides the matching `portico.toml` option.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Source directory (relative to the root directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Destination directory (relative to the root directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub destination: Option<PathBuf>,

    /// Base path every URL is prefixed with (e.g. `/docs`)
    #[arg(short = 'b', long = "base-path")]
    pub base_path: Option<String>,

    /// Remove the destination directory and render cache before building
    #[arg(short, long)]
    pub clean: bool,

    /// Render documents marked `draft: true`
    #[arg(short = 'D', long)]
    pub drafts: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Commands::Build { build_args } => build_args,
        }
    }
}
