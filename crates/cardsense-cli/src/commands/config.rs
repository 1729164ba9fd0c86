//! Config command - show or initialize engine configuration.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use cardsense_core::EngineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show {
        /// Config file to show (default: builtin defaults)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(default_value = "cardsense.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { file } => {
            let config = match file {
                Some(path) => EngineConfig::from_file(&path)?,
                None => EngineConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            EngineConfig::default().save(&path)?;
            println!(
                "{} Wrote default configuration to {}",
                style("✓").green(),
                path.display()
            );
            Ok(())
        }
    }
}
