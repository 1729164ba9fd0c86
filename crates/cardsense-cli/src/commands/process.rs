//! Process command - extract summary fields from a single statement.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use cardsense_core::models::FieldSlot;
use cardsense_core::{
    CsvSource, Engine, EngineConfig, PdfSource, ProfileSet, StatementSummary, TextSource,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, CSV, or pre-extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Issuer profiles JSON file (default: builtin profiles)
    #[arg(short, long)]
    profiles: Option<PathBuf>,

    /// Include which strategy resolved each field
    #[arg(long)]
    show_provenance: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("input file not found: {}", args.input.display());
    }

    let config = load_config(config_path)?;
    let engine = build_engine(config, args.profiles.as_deref())?;

    info!("processing file: {}", args.input.display());
    let summary = analyze_file(&engine, &args.input)?;

    let output = format_summary(&summary, args.format, args.show_provenance)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Wrote summary to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }
    Ok(())
}

pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<EngineConfig> {
    Ok(match config_path {
        Some(path) => EngineConfig::from_file(Path::new(path))?,
        None => EngineConfig::default(),
    })
}

pub(crate) fn build_engine(
    config: EngineConfig,
    profiles: Option<&Path>,
) -> anyhow::Result<Engine> {
    let mut engine = Engine::new().with_config(config);
    if let Some(path) = profiles {
        engine = engine.with_profiles(ProfileSet::from_file(path)?);
    }
    Ok(engine)
}

/// Analyze one file, choosing the source by extension. A failure here
/// fails this document only; batch callers continue with the next.
pub(crate) fn analyze_file(engine: &Engine, path: &Path) -> anyhow::Result<StatementSummary> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let summary = match extension.as_str() {
        "pdf" => engine.analyze(&PdfSource::from_path(path)?),
        "csv" => engine.analyze(&CsvSource::from_path(path)?),
        "txt" | "text" => engine.analyze(&TextSource::from_text(&fs::read_to_string(path)?)),
        other => anyhow::bail!("unsupported file format: {}", other),
    };
    Ok(summary)
}

pub(crate) fn format_summary(
    summary: &StatementSummary,
    format: OutputFormat,
    show_provenance: bool,
) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Json => {
            if show_provenance {
                serde_json::to_string_pretty(summary)?
            } else {
                serde_json::to_string_pretty(&summary.flat_map())?
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            let names: Vec<&str> = FieldSlot::ALL.iter().map(|s| s.name()).collect();
            writer.write_record(&names)?;
            let flat = summary.flat_map();
            let row: Vec<&str> = FieldSlot::ALL
                .iter()
                .map(|s| flat[s.name()].as_str())
                .collect();
            writer.write_record(&row)?;
            String::from_utf8(writer.into_inner()?)?
        }
        OutputFormat::Text => {
            let mut lines = Vec::new();
            lines.push(format!(
                "{} {}",
                style("Issuer:").bold(),
                summary.issuer.name()
            ));
            for slot in FieldSlot::ALL {
                let value = summary.get(slot);
                let rendered = if value.is_unknown() {
                    style(value.display().to_string()).dim()
                } else {
                    style(value.display().to_string()).green()
                };
                let mut line = format!("{:<18} {}", slot.name(), rendered);
                if show_provenance {
                    if let Some(strategy) = summary.diagnostics.provenance.get(&slot) {
                        line.push_str(&format!("  {}", style(format!("[{}]", strategy)).dim()));
                    }
                }
                lines.push(line);
            }
            lines.join("\n")
        }
    };
    Ok(output)
}
