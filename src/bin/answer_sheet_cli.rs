//! CLI tool for answer-sheet - regenerates the answer sheet of an XLSX file
//!
//! Usage:
//!   answer_sheet_cli <input.xlsx> -o out.xlsx
//!   answer_sheet_cli <input.xlsx> -o out.xlsx --config cfg.json --report report.json
//!   answer_sheet_cli <input.xlsx> -o out.xlsx --issues-csv issues.csv

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use answer_sheet::config::BlueprintChoice;
use answer_sheet::csv::{load_issue_csv, Delimiter};
use answer_sheet::layout::LinkMode;
use answer_sheet::template::BlueprintPreset;
use answer_sheet::{export, parser, Generator, GeneratorConfig, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BlueprintArg {
    SinglePhase,
    DevQaSplit,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LinkModeArg {
    IndexOffset,
    Compacted,
}

#[derive(Parser)]
#[command(
    version,
    about = "Generate the answer list: one answer section per issue, with links and status formulas."
)]
struct Args {
    /// Workbook holding the issue list, answer sheet and template.
    input: PathBuf,

    /// Where to write the regenerated workbook.
    #[arg(short, long)]
    output: PathBuf,

    /// Generator configuration (JSON). Missing fields take their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Replace the issue sheet with the rows of a CSV/TSV export.
    #[arg(long, value_name = "PATH")]
    issues_csv: Option<PathBuf>,

    /// Write the run report as JSON.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Override the configured section blueprint.
    #[arg(long, value_enum)]
    blueprint: Option<BlueprintArg>,

    /// Override how index rows map to sections.
    #[arg(long, value_enum)]
    link_mode: Option<LinkModeArg>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if !e.is_pre_write() {
                eprintln!("Generation stopped part-way; no output was written. Re-run to regenerate.");
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(blueprint) = args.blueprint {
        config.blueprint = BlueprintChoice::Preset(match blueprint {
            BlueprintArg::SinglePhase => BlueprintPreset::SinglePhase,
            BlueprintArg::DevQaSplit => BlueprintPreset::DevQaSplit,
        });
    }
    if let Some(mode) = args.link_mode {
        config.link_mode = match mode {
            LinkModeArg::IndexOffset => LinkMode::IndexOffset,
            LinkModeArg::Compacted => LinkMode::Compacted,
        };
    }
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let generator = Generator::new(config)?;

    let data = fs::read(&args.input)?;
    let mut workbook = parser::parse(&data)?;
    if let Some(csv_path) = &args.issues_csv {
        let csv = fs::read(csv_path)?;
        load_issue_csv(
            &mut workbook,
            &generator.config().index_sheet,
            &csv,
            Delimiter::from_path(csv_path),
        )?;
    }

    let report = generator.run(&mut workbook)?;
    fs::write(&args.output, export::write_xlsx(&workbook)?)?;
    eprintln!("Written: {}", args.output.display());

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn write_report(path: &Path, report: &answer_sheet::GenerateReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
