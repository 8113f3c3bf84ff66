use anyhow::Result;
use clap::{ColorChoice, Parser};
use portico::cli::{Cli, Commands, build::build_site};
use portico::config::{SiteConfig, cfg, init_config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    init_config(SiteConfig::load(&cli.config, cli.build_args())?);

    match &cli.command {
        Commands::Build { .. } => build_site(&cfg()).map(|_| ()),
    }
}
