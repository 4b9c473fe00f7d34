use anyhow::{Context, Result};
use colored::Colorize;
use convograph::config::{project::KEYS, Config};

use crate::cli::ConfigAction;

pub fn handle(action: ConfigAction) -> Result<()> {
    let mut config = Config::load_or_default(".").context("Failed to load configuration")?;

    match action {
        ConfigAction::Set { key, value } => {
            println!("{} Setting {} = {}",
                "→".bright_green(),
                key.bright_cyan(),
                value.bright_yellow());

            config.set(&key, &value)?;
            println!("{} Configuration updated", "✓".bright_green());
        }

        ConfigAction::Get { key } => {
            let value = config.get(&key)?;
            println!("{} = {}", key.bright_cyan(), value);
        }

        ConfigAction::List => {
            println!("{}", "Current Configuration:".bright_blue().bold());
            if !config.path.exists() {
                println!("  {} No configuration file found, showing defaults", "ℹ".bright_blue());
            }

            for key in KEYS {
                println!("  {} = {}",
                    key.bright_cyan(),
                    config.get(key)?.bright_yellow());
            }
        }
    }

    Ok(())
}
