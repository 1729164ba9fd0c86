//! Batch command - process many statement files.
//!
//! A document that fails to read is reported and skipped; the batch
//! always continues unless --fail-fast is set.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use cardsense_core::StatementSummary;
use cardsense_core::models::FieldSlot;

use super::process::{analyze_file, build_engine, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Directory for per-file JSON summaries (default: none)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write an aggregate CSV with one row per document
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Issuer profiles JSON file (default: builtin profiles)
    #[arg(short, long)]
    profiles: Option<PathBuf>,

    /// Stop at the first document that fails to read
    #[arg(long)]
    fail_fast: bool,
}

/// Result of processing a single file.
struct BatchResult {
    path: PathBuf,
    summary: Option<StatementSummary>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let engine = build_engine(config, args.profiles.as_deref())?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "csv" | "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("no matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut results: Vec<BatchResult> = Vec::with_capacity(files.len());
    for file in files {
        pb.set_message(file.display().to_string());
        match analyze_file(&engine, &file) {
            Ok(summary) => {
                results.push(BatchResult {
                    path: file,
                    summary: Some(summary),
                    error: None,
                });
            }
            Err(e) => {
                warn!("failed to process {}: {}", file.display(), e);
                if args.fail_fast {
                    pb.finish_and_clear();
                    error!("stopping batch after failure (--fail-fast)");
                    anyhow::bail!("failed to process {}: {}", file.display(), e);
                }
                results.push(BatchResult {
                    path: file,
                    summary: None,
                    error: Some(e.to_string()),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            let Some(summary) = &result.summary else { continue };
            let stem = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");
            let out_path = output_dir.join(format!("{}.json", stem));
            fs::write(&out_path, serde_json::to_string_pretty(summary)?)?;
        }
    }

    if let Some(ref csv_path) = args.summary_csv {
        write_summary_csv(csv_path, &results)?;
        println!(
            "{} Wrote aggregate CSV to {}",
            style("✓").green(),
            csv_path.display()
        );
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    println!(
        "{} Processed {} files ({} failed) in {:.1}s",
        style("✓").green(),
        results.len(),
        failed,
        start.elapsed().as_secs_f32()
    );
    for result in results.iter().filter(|r| r.error.is_some()) {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            result.path.display(),
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn write_summary_csv(path: &PathBuf, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = vec!["file", "issuer", "status"];
    header.extend(FieldSlot::ALL.iter().map(|s| s.name()));
    writer.write_record(&header)?;

    for result in results {
        let mut row: Vec<String> = vec![result.path.display().to_string()];
        match &result.summary {
            Some(summary) => {
                row.push(summary.issuer.name().to_string());
                row.push("ok".to_string());
                let flat = summary.flat_map();
                row.extend(FieldSlot::ALL.iter().map(|s| flat[s.name()].clone()));
            }
            None => {
                row.push(String::new());
                row.push(format!(
                    "error: {}",
                    result.error.as_deref().unwrap_or("unknown")
                ));
                row.extend(FieldSlot::ALL.iter().map(|_| String::new()));
            }
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
