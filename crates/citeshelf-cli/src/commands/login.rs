//! The `login` and `logout` commands.
//!
//! Tokens are issued by the web application; this only stores one for later commands.

use super::*;

/// Arguments for [`Commands::Login`]
#[derive(Args, Clone, Debug)]
pub struct LoginArgs {
  /// The bearer token; prompted for when omitted
  pub token: Option<String>,
}

/// Function for the [`Commands::Login`] in the CLI.
pub fn login<I: UserInteraction>(interaction: &I, ctx: &Context, args: LoginArgs) -> Result<()> {
  let token = match args.token {
    Some(token) => token,
    None => interaction.prompt_secret("Bearer token")?,
  };
  ctx.session.login(token)?;
  interaction.reply(ResponseContent::Success("Logged in"))
}

/// Function for the [`Commands::Logout`] in the CLI.
pub fn logout<I: UserInteraction>(interaction: &I, ctx: &Context) -> Result<()> {
  if !ctx.session.is_authenticated() {
    return interaction.reply(ResponseContent::Info("Not logged in"));
  }
  ctx.session.invalidate()?;
  interaction.reply(ResponseContent::Success("Logged out"))
}
