//! The `save` command: store a paper in several libraries at once.

use citeshelf::library::{
  list_libraries,
  workflow::{LibrarySaveWorkflow, TargetSelection},
};

use super::*;

/// Arguments for [`Commands::Save`]
#[derive(Args, Clone, Debug)]
pub struct SaveArgs {
  /// The paper
  #[command(flatten)]
  pub paper: PaperArgs,

  /// Id of a library to save into, repeat for several. Prompts for a selection when omitted.
  #[arg(long = "library", short = 'l')]
  pub libraries: Vec<String>,
}

/// Function for the [`Commands::Save`] in the CLI.
pub async fn save<I: UserInteraction>(interaction: &I, ctx: &Context, args: SaveArgs) -> Result<()> {
  // Anonymous users are stopped before any request goes out
  ctx.session.require_token()?;

  let paper = args.paper.resolve(ctx).await?;
  let listing = list_libraries(&ctx.client, &ctx.session).await?;

  let mut selection = TargetSelection::new();
  if args.libraries.is_empty() {
    let targets: Vec<&LibraryTarget> = listing.all().collect();
    let labels: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
    for index in interaction.select_many("Save into", &labels)? {
      if let Some(target) = targets.get(index) {
        selection.select((*target).clone());
      }
    }
  } else {
    for id in &args.libraries {
      match listing.find(id) {
        Some(target) => selection.select(target.clone()),
        None => interaction.reply(ResponseContent::Warning(&format!("No library with id {id}")))?,
      }
    }
  }

  let known_bibtex = paper
    .bibtex
    .as_deref()
    .filter(|b| !b.trim().is_empty())
    .map(|b| CitationFormat::loaded(CitationStyle::Bibtex, b));
  let workflow = LibrarySaveWorkflow::new(&ctx.client, &ctx.client, &ctx.session);
  let report = workflow.run(&paper, &mut selection, known_bibtex.as_ref()).await?;
  interaction.reply(ResponseContent::Report(&report))
}
