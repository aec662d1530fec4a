mod cmd;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// debkit - build Debian packages from an XML manifest
#[derive(Parser)]
#[command(name = "debkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

/// The three build parameters every package command takes.
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
  /// Package name
  pub name: String,
  /// Package version
  pub version: String,
  /// Target architecture (e.g. amd64)
  pub arch: String,
}

#[derive(Subcommand)]
enum Commands {
  /// Materialize the manifest and build {name}_{version}_{arch}.deb
  Package {
    #[command(flatten)]
    args: PackageArgs,

    /// Print the build report as JSON
    #[arg(long)]
    json: bool,
  },

  /// Install the built package with dpkg
  Install {
    #[command(flatten)]
    args: PackageArgs,
  },

  /// Purge the package with dpkg
  Uninstall {
    #[command(flatten)]
    args: PackageArgs,
  },

  /// Remove the build directory and every .deb in the working directory
  Clean,

  /// Show the substituted manifest tree without building anything
  Inspect {
    #[command(flatten)]
    args: PackageArgs,

    /// Only show the node with this id
    id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Package { args, json } => cmd::cmd_package(&args, json),
    Commands::Install { args } => cmd::cmd_install(&args),
    Commands::Uninstall { args } => cmd::cmd_uninstall(&args),
    Commands::Clean => cmd::cmd_clean(),
    Commands::Inspect { args, id, output } => cmd::cmd_inspect(&args, id.as_deref(), output),
  }
}
