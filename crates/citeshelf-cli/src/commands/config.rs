//! The `config` command.

use super::*;

/// Subcommands of [`Commands::Config`]
#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
  /// Print the effective configuration
  Show,

  /// Write a configuration file with default values
  Init {
    /// API root to store instead of the default
    #[arg(long)]
    base_url: Option<String>,
  },
}

/// Function for the [`Commands::Config`] in the CLI.
pub fn config<I: UserInteraction>(interaction: &I, path: &Path, action: ConfigAction) -> Result<()> {
  match action {
    ConfigAction::Show => {
      let config = Config::load(path)?;
      interaction.reply(ResponseContent::Info(&format!("Configuration at {}", path.display())))?;
      println!("{}", toml::to_string_pretty(&config)?);
      Ok(())
    },
    ConfigAction::Init { base_url } => {
      if path.exists()
        && !interaction.confirm(&format!("{} exists. Overwrite?", path.display()))?
      {
        return interaction.reply(ResponseContent::Info("Configuration left unchanged"));
      }

      let mut config = Config::default();
      if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
      }
      config.validate()?;
      config.save(path)?;
      interaction.reply(ResponseContent::Success(&format!(
        "Configuration written to {}",
        path.display()
      )))
    },
  }
}
