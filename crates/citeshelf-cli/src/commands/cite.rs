//! The `cite` command: print citations in one or every style.

use super::*;

/// Arguments for [`Commands::Cite`]
#[derive(Args, Clone, Debug)]
pub struct CiteArgs {
  /// The paper
  #[command(flatten)]
  pub paper: PaperArgs,

  /// Only print this style (bibtex, mla, apa, ieee)
  #[arg(long, short, value_parser = parse_style)]
  pub style: Option<CitationStyle>,
}

/// Function for the [`Commands::Cite`] in the CLI.
pub async fn cite<I: UserInteraction>(interaction: &I, ctx: &Context, args: CiteArgs) -> Result<()> {
  let paper = args.paper.resolve(ctx).await?;
  let cache = load_citations(ctx, &paper).await;

  let formats = match args.style {
    Some(style) => cache.get(style).into_iter().collect(),
    None => cache.formats(),
  };
  for format in formats.iter().filter(|f| f.is_loaded) {
    interaction.reply(ResponseContent::Citation(format))?;
  }
  if let Some(pending) = formats.iter().find(|f| !f.is_loaded) {
    interaction.reply(ResponseContent::Warning(&format!("{} is still loading", pending.label)))?;
  }
  Ok(())
}
