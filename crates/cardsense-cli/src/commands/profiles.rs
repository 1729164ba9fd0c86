//! Profiles command - inspect and validate issuer profile data.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use cardsense_core::ProfileSet;

/// Arguments for the profiles command.
#[derive(Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    command: ProfilesCommand,
}

#[derive(Subcommand)]
enum ProfilesCommand {
    /// List issuer profiles and their fingerprints
    List {
        /// Profiles JSON file (default: builtin profiles)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Validate a profiles JSON file
    Check {
        /// Profiles JSON file
        file: PathBuf,
    },
}

pub async fn run(args: ProfilesArgs) -> anyhow::Result<()> {
    match args.command {
        ProfilesCommand::List { file } => {
            let profiles = match file {
                Some(path) => ProfileSet::from_file(&path)?,
                None => ProfileSet::builtin(),
            };
            for profile in profiles.iter() {
                println!("{}", style(profile.issuer.name()).bold());
                if profile.fingerprints.is_empty() {
                    println!("  fingerprints: (fallback, matches everything)");
                } else {
                    println!("  fingerprints: {}", profile.fingerprints.join(", "));
                }
                if !profile.synonyms.is_empty() {
                    println!("  synonym overrides: {} slots", profile.synonyms.len());
                }
            }
            Ok(())
        }
        ProfilesCommand::Check { file } => match ProfileSet::from_file(&file) {
            Ok(profiles) => {
                println!(
                    "{} {} is valid ({} profiles)",
                    style("✓").green(),
                    file.display(),
                    profiles.iter().count()
                );
                Ok(())
            }
            Err(e) => {
                anyhow::bail!("{} is invalid: {}", file.display(), e)
            }
        },
    }
}
