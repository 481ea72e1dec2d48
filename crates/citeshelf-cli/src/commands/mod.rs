use super::*;

pub mod cite;
pub mod config;
pub mod copy;
pub mod create;
pub mod export;
pub mod libraries;
pub mod login;
pub mod save;
pub mod show;

pub use cite::{cite, CiteArgs};
pub use config::{config, ConfigAction};
pub use copy::{copy, CopyArgs};
pub use create::{create, CreateArgs};
pub use export::{export, ExportArgs};
pub use libraries::{libraries, LibrariesArgs};
pub use login::{login, logout, LoginArgs};
pub use save::{save, SaveArgs};
pub use show::show;

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Store the bearer token used by the library commands
  Login(LoginArgs),

  /// Forget the stored bearer token
  Logout,

  /// Display a paper's details
  Show(PaperArgs),

  /// Print a paper's citations
  Cite(CiteArgs),

  /// Copy one citation to the clipboard
  Copy(CopyArgs),

  /// Write citations to a file
  Export(ExportArgs),

  /// List owned and shared libraries
  Libraries(LibrariesArgs),

  /// Save a paper into one or more libraries
  Save(SaveArgs),

  /// Create a new library
  CreateLibrary(CreateArgs),

  /// Inspect or initialize the configuration file
  Config {
    /// What to do with the configuration
    #[command(subcommand)]
    action: ConfigAction,
  },
}

/// Where a command takes its paper from.
#[derive(Args, Clone, Debug)]
pub struct PaperArgs {
  /// External paper id, e.g. `204e3073870fae3d05bcbc2f6a8e263d9b72e776` or
  /// `DOI:10.18653/v1/N19-1423`
  #[arg(required_unless_present = "file")]
  pub paper_id: Option<String>,

  /// Read the paper from a JSON file instead of fetching it
  #[arg(long, conflicts_with = "paper_id")]
  pub file: Option<PathBuf>,
}

impl PaperArgs {
  /// Fetches or reads the paper.
  pub async fn resolve(&self, ctx: &Context) -> Result<Paper> {
    match (&self.paper_id, &self.file) {
      (_, Some(path)) => {
        debug!("Reading paper from {path:?}");
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
      },
      (Some(paper_id), None) => Ok(ctx.client.get_paper(paper_id).await?),
      (None, None) => Err(CliError::Usage("A paper id or --file is required".into())),
    }
  }
}

/// Opens a citation view for `paper` and waits until every format is loaded.
///
/// Formats the citation service does not deliver are generated locally, immediately when the
/// service fails and after the configured fallback delay otherwise.
pub async fn load_citations(ctx: &Context, paper: &Paper) -> CitationFormatCache {
  let cache = CitationFormatCache::open(paper, ctx.config.citation_fallback());
  cache.load(&ctx.client).await;
  cache.settle().await;
  cache
}

/// Parses a citation style argument.
pub fn parse_style(s: &str) -> std::result::Result<CitationStyle, String> {
  CitationStyle::from_str(s).map_err(|e| e.to_string())
}
