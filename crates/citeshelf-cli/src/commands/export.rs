//! The `export` command: download citations as files.

use citeshelf::export::FileExporter;

use super::*;

/// Arguments for [`Commands::Export`]
#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
  /// The paper
  #[command(flatten)]
  pub paper: PaperArgs,

  /// Only export this style; without it every style goes into one file
  #[arg(long, short, value_parser = parse_style)]
  pub style: Option<CitationStyle>,

  /// Directory to write into, defaults to the configured download directory
  #[arg(long, short)]
  pub dir: Option<PathBuf>,
}

/// Function for the [`Commands::Export`] in the CLI.
pub async fn export<I: UserInteraction>(
  interaction: &I,
  ctx: &Context,
  args: ExportArgs,
) -> Result<()> {
  let paper = args.paper.resolve(ctx).await?;
  let cache = load_citations(ctx, &paper).await;
  let exporter = FileExporter::new(args.dir.as_ref().unwrap_or(&ctx.config.download_dir));

  let path = match args.style {
    Some(style) => {
      let format = cache.get(style).ok_or(CiteshelfError::NotLoaded(style))?;
      exporter.export(&paper.title, &format)?
    },
    None => exporter.export_batch(&paper.title, &cache.formats())?,
  };
  interaction.reply(ResponseContent::Success(&format!("Wrote {}", path.display())))
}
