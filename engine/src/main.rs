// clipping-engine: loads a clipping export and prints dashboard data.
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::config::DashboardSettings;
use engine::data::{MateriaFilter, MateriaStore};
use engine::export::{write_csv, ExportTable};
use engine::services::{DashboardService, SectionId, SectionReport};
use shared::brazilian_format::parse_date;
use shared::Field;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "clipping-engine",
    about = "Aggregates press-clipping records into dashboard chart data"
)]
struct Cli {
    /// Settings JSON overriding the embedded defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one dashboard section, or all of them.
    Report {
        #[command(flatten)]
        source: SourceArgs,
        /// Section id (metrics, panorama, timeline, ...) or "all".
        #[arg(long, default_value = "all")]
        section: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Compute a single named chart view.
    View {
        #[command(flatten)]
        source: SourceArgs,
        /// group_count, group_sum, cross_tab or timeline.
        #[arg(long)]
        kind: String,
        /// View parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// List the filter options of a field.
    Options {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        field: String,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Records as JSON (API payload or array) or `;`-separated CSV.
    #[arg(long)]
    input: PathBuf,
    /// First day included, DD/MM/YYYY.
    #[arg(long)]
    from: Option<String>,
    /// Last day included, DD/MM/YYYY.
    #[arg(long)]
    to: Option<String>,
    /// Restrict FIELD to VALUE; repeat to select several values.
    #[arg(long = "select", value_name = "FIELD=VALUE")]
    selections: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => DashboardSettings::load_from_file(path)?,
        None => DashboardSettings::load_default()?,
    };
    info!(version = %settings.version, "Starting clipping engine");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Report { source, section, format } => {
            let (service, filter) = open(&source, settings)?;
            let reports = if section.eq_ignore_ascii_case("all") {
                service.report(&filter)
            } else {
                vec![service.section(section.parse::<SectionId>()?, &filter)]
            };
            print_reports(&mut out, &reports, format, service.settings().csv_delimiter()?)?;
        }
        Command::View { source, kind, params, format } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .with_context(|| format!("Invalid --params JSON: {}", params))?;
            let (service, filter) = open(&source, settings)?;
            let payload = service.view(&kind, &params, &filter)?;
            match format {
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &payload)?,
                OutputFormat::Csv => {
                    let delimiter = service.settings().csv_delimiter()?;
                    write_csv(&ExportTable::from_payload(&payload), &mut out, delimiter)?
                }
            }
        }
        Command::Options { source, field } => {
            let field: Field = field.parse()?;
            let (service, _) = open(&source, settings)?;
            serde_json::to_writer_pretty(&mut out, &service.store().distinct_values(field))?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn open(
    source: &SourceArgs,
    settings: DashboardSettings,
) -> Result<(DashboardService, MateriaFilter)> {
    let store = MateriaStore::load(&source.input, &settings)
        .with_context(|| format!("Failed to load records from '{}'", source.input.display()))?;
    info!(records = store.len(), "Records loaded");
    let filter = build_filter(source)?;
    Ok((DashboardService::new(store, settings), filter))
}

fn build_filter(source: &SourceArgs) -> Result<MateriaFilter> {
    let from = source.from.as_deref().map(|s| cli_date("--from", s)).transpose()?;
    let to = source.to.as_deref().map(|s| cli_date("--to", s)).transpose()?;
    let mut filter = MateriaFilter::between(from, to);
    for selection in &source.selections {
        let (field, value) = selection
            .split_once('=')
            .ok_or_else(|| anyhow!("--select expects FIELD=VALUE, got '{}'", selection))?;
        filter = filter.select(field.parse::<Field>()?, value.trim());
    }
    Ok(filter)
}

fn cli_date(flag: &str, value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| anyhow!("{} expects a DD/MM/YYYY date, got '{}'", flag, value))
}

fn print_reports<W: Write>(
    out: &mut W,
    reports: &[SectionReport],
    format: OutputFormat,
    delimiter: u8,
) -> Result<()> {
    match format {
        OutputFormat::Json => serde_json::to_writer_pretty(out, reports)?,
        OutputFormat::Csv => {
            for report in reports {
                for chart in &report.charts {
                    writeln!(out, "# {}.{}", report.id, chart.id)?;
                    write_csv(&ExportTable::from_chart(chart), &mut *out, delimiter)?;
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}
