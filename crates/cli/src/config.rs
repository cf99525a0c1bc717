//! `glx config` and config loading for the other commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use grandlivre_fusion::FusionConfig;

use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config as TOML
    #[command(after_help = "\
Examples:
  glx config show > export.glx.toml
  glx config show export.glx.toml
  glx --config export.glx.toml config show")]
    Show {
        /// Config file (overrides --config)
        file: Option<PathBuf>,
    },

    /// Check that a config file parses and validates
    #[command(after_help = "\
Examples:
  glx config validate export.glx.toml")]
    Validate {
        /// Config file (overrides --config)
        file: Option<PathBuf>,
    },
}

pub fn cmd_config(global: Option<&Path>, cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Show { file } => {
            let config = load(file.as_deref().or(global))?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigCommands::Validate { file } => {
            let path = file.as_deref().or(global).ok_or_else(|| {
                CliError::args("no config file given")
                    .with_hint("pass a file, or set --config / GLX_CONFIG")
            })?;
            let config = load(Some(path))?;
            eprintln!(
                "{}: ok (comptes code {}, tiers code {})",
                path.display(),
                config.layouts.comptes.code_pattern,
                config.layouts.tiers.code_pattern
            );
            Ok(())
        }
    }
}

/// The config at `path`, or the stock config when no path is given.
pub fn load(path: Option<&Path>) -> Result<FusionConfig, CliError> {
    let Some(path) = path else {
        return Ok(FusionConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let config = FusionConfig::from_toml(&text).map_err(|e| {
        let mut err = CliError::from(e);
        err.message = format!("{}: {}", path.display(), err.message);
        err
    })?;
    log::debug!("loaded config {}", path.display());
    Ok(config)
}
