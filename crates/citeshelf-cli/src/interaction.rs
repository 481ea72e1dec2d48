//! Terminal output and prompts.

use console::Term;
use dialoguer::{Confirm, MultiSelect, Password};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Prefix for items of a tree
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last item of a tree
pub static LAST_ITEM_PREFIX: &str = "└─";

/// Something a command wants to show the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Details of one paper
  Paper(&'a Paper),
  /// One rendered citation
  Citation(&'a CitationFormat),
  /// A page of libraries
  Libraries(Page<'a, LibraryTarget>),
  /// Outcome of a multi-library save
  Report(&'a SaveReport),
  /// Something worked
  Success(&'a str),
  /// Neutral information
  Info(&'a str),
  /// Something degraded but not failed
  Warning(&'a str),
  /// A command failed
  Error(&'a CliError),
}

/// The ways a command talks to its user.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;

  /// Asks for a secret without echoing it.
  fn prompt_secret(&self, message: &str) -> Result<String>;

  /// Lets the user pick any number of `items`, returning their indices.
  fn select_many(&self, message: &str, items: &[String]) -> Result<Vec<usize>>;

  /// Shows a response.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Interactive terminal backed by `dialoguer`.
pub struct Terminal {
  /// Answer every prompt with its default instead of asking
  accept_defaults: bool,
  /// Output for replies
  stdout:          Term,
  /// Output for errors
  stderr:          Term,
}

impl Terminal {
  /// Creates the terminal; with `accept_defaults` no prompt is ever shown.
  pub fn new(accept_defaults: bool) -> Self {
    Self { accept_defaults, stdout: Term::stdout(), stderr: Term::stderr() }
  }

  /// Error for prompts that cannot be answered without input.
  fn non_interactive(message: &str) -> CliError { CliError::NonInteractive(message.to_string()) }

  /// Prints a paper as a small tree.
  fn write_paper(&self, paper: &Paper) -> Result<()> {
    let mut rows = vec![];
    if !paper.paper_id.is_empty() {
      rows.push(("ID", paper.paper_id.clone()));
    }
    let authors = paper.author_names().into_iter().filter(|n| !n.is_empty()).collect::<Vec<_>>();
    rows.push(("Authors", if authors.is_empty() { "Unknown".into() } else { authors.join(", ") }));
    rows.push(("Venue", paper.venue.or_unknown().to_string()));
    rows.push(("Year", paper.year.map_or_else(|| "n.d.".into(), |y| y.to_string())));
    rows.push(("Citations", paper.citation_count.to_string()));
    if !paper.fields_of_study.is_empty() {
      rows.push(("Fields", paper.fields_of_study.join(", ")));
    }
    if let Some(pdf) = paper.open_access_pdf.as_ref().filter(|_| paper.is_open_access()) {
      rows.push(("PDF", pdf.url.clone()));
    }

    self.stdout.write_line(&format!("{}", style(&paper.title).bold()))?;
    let last = rows.len() - 1;
    for (i, (label, value)) in rows.into_iter().enumerate() {
      let prefix = if i == last { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
      let line = format!("{} {}: {value}", style(prefix).dim(), style(label).cyan());
      self.stdout.write_line(&line)?;
    }
    if !paper.abstract_text.is_empty() {
      self.stdout.write_line("")?;
      self.stdout.write_line(&paper.abstract_text)?;
    }
    Ok(())
  }
}

impl UserInteraction for Terminal {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(Confirm::new().with_prompt(format!("{PROMPT_PREFIX}{message}")).interact()?)
  }

  fn prompt_secret(&self, message: &str) -> Result<String> {
    if self.accept_defaults {
      return Err(Self::non_interactive(message));
    }
    Ok(Password::new().with_prompt(format!("{PROMPT_PREFIX}{message}")).interact()?)
  }

  fn select_many(&self, message: &str, items: &[String]) -> Result<Vec<usize>> {
    if self.accept_defaults {
      return Ok(Vec::new());
    }
    Ok(
      MultiSelect::new()
        .with_prompt(format!("{PROMPT_PREFIX}{message} (space to select, enter to confirm)"))
        .items(items)
        .interact()?,
    )
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Paper(paper) => self.write_paper(paper)?,
      ResponseContent::Citation(format) => {
        self.stdout.write_line(&format!("{}", style(&format.label).bold().underlined()))?;
        self.stdout.write_line(&citeshelf::export::plain_text(format))?;
        self.stdout.write_line("")?;
      },
      ResponseContent::Libraries(page) => {
        if page.total_items == 0 {
          self.stdout.write_line(&format!("{}No libraries yet", style(INFO_PREFIX).blue()))?;
          return Ok(());
        }
        for (i, library) in page.items.iter().enumerate() {
          let count = library.paper_count.map(|c| format!(", {c} papers")).unwrap_or_default();
          self.stdout.write_line(&format!(
            "{:>3}. {} {}{count}",
            page.offset + i + 1,
            style(&library.id).dim(),
            library
          ))?;
        }
        self.stdout.write_line(&format!(
          "{}Page {} of {} ({} libraries)",
          style(INFO_PREFIX).blue(),
          page.number,
          page.total_pages,
          page.total_items
        ))?;
      },
      ResponseContent::Report(report) => {
        let (prefix, summary) = match (report.saved_count(), report.failed_count()) {
          (_, 0) => (style(SUCCESS_PREFIX).green(), style(report.summary()).green()),
          (0, _) => (style(ERROR_PREFIX).red(), style(report.summary()).red()),
          _ => (style(WARNING_PREFIX).yellow(), style(report.summary()).yellow()),
        };
        self.stdout.write_line(&format!("{prefix}{summary}"))?;
      },
      ResponseContent::Success(message) => {
        self.stdout.write_line(&format!("{}{message}", style(SUCCESS_PREFIX).green()))?
      },
      ResponseContent::Info(message) => {
        self.stdout.write_line(&format!("{}{message}", style(INFO_PREFIX).blue()))?
      },
      ResponseContent::Warning(message) => {
        self.stderr.write_line(&format!("{}{message}", style(WARNING_PREFIX).yellow()))?
      },
      ResponseContent::Error(error) => {
        self.stderr.write_line(&format!("{}{error}", style(ERROR_PREFIX).red()))?
      },
    }
    Ok(())
  }
}
