//! The `create-library` command.

use citeshelf::library::{create_library, NewLibrary};

use super::*;

/// Arguments for [`Commands::CreateLibrary`]
#[derive(Args, Clone, Debug)]
pub struct CreateArgs {
  /// Name of the new library
  pub name: String,

  /// Optional description
  #[arg(long, short)]
  pub description: Option<String>,

  /// Make the library publicly visible
  #[arg(long)]
  pub public: bool,
}

/// Function for the [`Commands::CreateLibrary`] in the CLI.
pub async fn create<I: UserInteraction>(
  interaction: &I,
  ctx: &Context,
  args: CreateArgs,
) -> Result<()> {
  let mut request = NewLibrary::new(args.name).public(args.public);
  if let Some(description) = args.description {
    request = request.with_description(description);
  }

  let library = create_library(&ctx.client, &ctx.session, request).await?;
  interaction.reply(ResponseContent::Success(&format!(
    "Created library {} (id {})",
    library.name, library.id
  )))
}
