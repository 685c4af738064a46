mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stackbuild_lib::consts::{ENV_CONFIG, ENV_DEFINITION, ENV_INSTALL_DIR};
use stackbuild_lib::stack::{InstallOptions, Stack};
use tracing_subscriber::EnvFilter;

use crate::cmd::{cmd_export, cmd_import, cmd_info, cmd_install, cmd_modules};
use crate::output::print_error;

/// stackbuild - build and install stacks of interdependent software components
#[derive(Parser)]
#[command(name = "stackbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Locations of the two stack documents.
#[derive(Args, Debug)]
struct StackArgs {
  /// Path to the stack definition (JSON)
  #[arg(short, long, env = ENV_DEFINITION)]
  definition: PathBuf,

  /// Path to the stack config (JSON)
  #[arg(short, long, env = ENV_CONFIG)]
  config: PathBuf,

  /// Override the install directory from the stack config
  #[arg(long, env = ENV_INSTALL_DIR)]
  install_dir: Option<PathBuf>,
}

impl StackArgs {
  fn load(&self) -> Result<Stack> {
    let stack = Stack::load(&self.definition, &self.config)
      .with_context(|| format!("Failed to load stack from {}", self.definition.display()))?;
    match &self.install_dir {
      Some(dir) => Ok(stack.with_install_dir(dir)?),
      None => Ok(stack),
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Build and install every component of a stack
  Install {
    #[command(flatten)]
    stack: StackArgs,

    /// The target system is private, allowing private stacks
    #[arg(long)]
    private: bool,

    /// Run `make install` through sudo
    #[arg(long)]
    sudo: bool,

    /// Do not record command manifests in install directories
    #[arg(long)]
    no_manifest: bool,
  },

  /// Archive the install tree of a stack as <stack>.tar.bz2
  Export {
    #[command(flatten)]
    stack: StackArgs,
  },

  /// Unpack an exported archive into the stack directory
  Import {
    #[command(flatten)]
    stack: StackArgs,

    /// Archive produced by `stackbuild export`
    archive: PathBuf,
  },

  /// Write environment modulefiles for an installed stack
  Modules {
    #[command(flatten)]
    stack: StackArgs,

    /// Copyright line placed at the top of every modulefile
    #[arg(long, default_value = "")]
    copyright: String,

    /// Prefix for generated environment variable names
    #[arg(long, default_value = "")]
    prefix: String,
  },

  /// Show a stack definition and where it installs
  Info {
    #[command(flatten)]
    stack: StackArgs,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Install {
      stack,
      private,
      sudo,
      no_manifest,
    } => {
      let options = InstallOptions {
        public_system: !private,
        sudo,
        record_manifests: !no_manifest,
      };
      cmd_install(&stack.load()?, options)
    }
    Commands::Export { stack } => cmd_export(&stack.load()?),
    Commands::Import { stack, archive } => cmd_import(&stack.load()?, &archive),
    Commands::Modules {
      stack,
      copyright,
      prefix,
    } => cmd_modules(&stack.load()?, &copyright, &prefix),
    Commands::Info { stack } => cmd_info(&stack.load()?),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli.command) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
