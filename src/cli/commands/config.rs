use clap::Subcommand;

use crate::cli::output::get_formatter;
use crate::error::{AppError, ConfigError};
use crate::models::{Config, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write the default configuration to disk
    Init,

    /// Print the configuration file path
    Path,
}

pub async fn handle_config(
    cmd: ConfigCommand,
    format: OutputFormat,
    _verbose: bool,
) -> Result<(), AppError> {
    let formatter = get_formatter(format);

    match cmd {
        ConfigCommand::Show => {
            let config = Config::load()?;
            let rendered = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
            print!("{}", rendered);
        }
        ConfigCommand::Init => {
            let config = Config::default();
            config.save()?;
            let path = Config::config_path()
                .ok_or_else(|| ConfigError::PathError("no config directory".to_string()))?;
            println!(
                "{}",
                formatter.format_message(&format!("Wrote defaults to {}", path.display()))
            );
        }
        ConfigCommand::Path => {
            let path = Config::config_path()
                .ok_or_else(|| ConfigError::PathError("no config directory".to_string()))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
