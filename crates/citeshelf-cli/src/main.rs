//! Command line front end for the citeshelf citation and library client.
//!
//! Every paper detail view of the web client has a command here:
//! - Rendering and copying citations in BibTeX, MLA, APA and IEEE styles
//! - Downloading citations as `.bib` or `.txt` files
//! - Listing libraries and saving a paper into several of them at once
//! - Holding the bearer token the library commands need
//!
//! # Usage
//!
//! ```bash
//! # Store a token once
//! citeshelf login
//!
//! # Print every citation style for a paper
//! citeshelf cite 204e3073870fae3d05bcbc2f6a8e263d9b72e776
//!
//! # Copy the APA entry
//! citeshelf copy 204e3073870fae3d05bcbc2f6a8e263d9b72e776 --style apa
//!
//! # Save into two libraries
//! citeshelf save 204e3073870fae3d05bcbc2f6a8e263d9b72e776 -l 3 -l 7
//! ```
//!
//! Papers can also be read from a JSON file with `--file`, in which case citations are
//! generated locally whenever the citation service cannot be reached. Logging verbosity is
//! raised with repeated `-v` flags.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  path::{Path, PathBuf},
  str::FromStr,
};

use citeshelf::{
  citation::{cache::CitationFormatCache, CitationFormat, CitationStyle},
  client::ApiClient,
  error::CiteshelfError,
  library::{workflow::SaveReport, LibraryTarget},
  pagination::Page,
  paper::Paper,
  session::Session,
  Config,
};
use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod clipboard;
pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Cite, export and save research papers")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. If not specified, uses the default platform-specific
  /// config directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

/// Everything a command needs besides its arguments.
pub struct Context {
  /// Loaded configuration
  pub config:  Config,
  /// Client for the paper, citation and library endpoints
  pub client:  ApiClient,
  /// Holder of the bearer token
  pub session: Session,
}

impl Context {
  /// Loads configuration and session from disk.
  fn load(config_path: &Path) -> Result<Self> {
    let config = Config::load(config_path)?;
    trace!("Loaded configuration from {config_path:?}: {config:?}");
    let client = ApiClient::new(&config)?;
    let session = Session::load(&config.session_path)?;
    Ok(Self { config, client, session })
  }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used (0-3)
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  // Citations go to stdout, logs stay out of their way
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Runs the parsed command.
async fn run(cli: Cli, interaction: &Terminal) -> Result<()> {
  let config_path = cli.config.unwrap_or_else(Config::default_path);
  debug!("Using configuration at {config_path:?}");

  // Configuration commands must work even when the current file is broken
  if let Commands::Config { action } = cli.command {
    return config(interaction, &config_path, action);
  }

  let ctx = Context::load(&config_path)?;
  match cli.command {
    Commands::Login(args) => login(interaction, &ctx, args),
    Commands::Logout => logout(interaction, &ctx),
    Commands::Show(args) => show(interaction, &ctx, args).await,
    Commands::Cite(args) => cite(interaction, &ctx, args).await,
    Commands::Copy(args) => copy(interaction, &ctx, args).await,
    Commands::Export(args) => export(interaction, &ctx, args).await,
    Commands::Libraries(args) => libraries(interaction, &ctx, args).await,
    Commands::Save(args) => save(interaction, &ctx, args).await,
    Commands::CreateLibrary(args) => create(interaction, &ctx, args).await,
    Commands::Config { .. } => Ok(()),
  }
}

/// Entry point for the citeshelf CLI application
///
/// Parses arguments, sets up logging and runs the command. Failures are printed with the
/// error prefix and turn into a non-zero exit code.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let interaction = Terminal::new(cli.accept_defaults);
  if let Err(e) = run(cli, &interaction).await {
    if interaction.reply(ResponseContent::Error(&e)).is_err() {
      eprintln!("{} {e}", style(ERROR_PREFIX).red());
    }
    std::process::exit(1);
  }
}
