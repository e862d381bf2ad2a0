//! tagdown CLI - Documentation directive pipeline.
//!
//! Provides commands for:
//! - `build`: Expand Hexo tags and remark directives across a source tree
//! - `sidebar`: Print the flattened and expanded views of a sidebar file

mod commands;
mod error;
mod output;
mod site;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, SidebarArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// tagdown - Documentation directive pipeline.
#[derive(Parser)]
#[command(name = "tagdown", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform every page of the source tree into the output directory.
    Build(BuildArgs),
    /// Print a normalized sidebar as JSON.
    Sidebar(SidebarArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Build(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(VERSION),
        Commands::Sidebar(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_flags_conflict() {
        let result = Cli::try_parse_from(["tagdown", "build", "--validate", "--no-validate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_environment_rejected() {
        let result = Cli::try_parse_from(["tagdown", "build", "--env", "qa"]);
        assert!(result.is_err());
    }
}
