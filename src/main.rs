mod config;
mod dates;
mod error;
mod reader;
mod reports;
mod schema;
mod table;
mod writer;

use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::ReportConfig;
use dates::DatePolicy;
use reports::{ReportKind, ReportParams};

/// Club reported on when none is given.
const DEFAULT_CLUB: &str = "DeakinACTIVE Waurn Ponds";

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    European,
}

impl OutputFormat {
    pub fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            OutputFormat::Tsv => b'\t',
            OutputFormat::European => b';',
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "clubreport")]
#[command(version, about = "Membership, session and booking reports from club exports")]
pub struct Args {
    /// Report to generate
    #[arg(value_enum)]
    pub report: ReportKind,

    /// Export to read (.xlsx, .xls or .csv)
    pub input: PathBuf,

    /// Club for membership reports
    #[arg(short, long, default_value = DEFAULT_CLUB)]
    pub club: String,

    /// Reference date, YYYY-MM-DD (default: today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Sheet by name or index (default: first sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Rows above the header line (default depends on the report)
    #[arg(long)]
    pub skip_rows: Option<usize>,

    /// Output file; .xlsx writes a workbook (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format for delimited output
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Value for empty cells
    #[arg(short, long, default_value = "")]
    pub empty: String,

    /// Fail on unreadable member dates instead of treating them as unknown
    #[arg(long)]
    pub strict_dates: bool,

    /// JSON file overriding clubs, plans, activities or zone weights
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print detailed progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Initialize the tracing subscriber; RUST_LOG wins over --verbose.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> error::Result<()> {
    // Reject a bad date before touching the file
    let reference = match &args.date {
        Some(date) => dates::parse_reference_date(date)?,
        None => chrono::Local::now().date_naive(),
    };

    let config = match &args.config {
        Some(path) => {
            debug!(path = ?path, "Loading report config");
            ReportConfig::load(path)?
        }
        None => ReportConfig::default(),
    };

    let options = reader::LoadOptions {
        sheet: args.sheet.as_deref().map(reader::parse_sheet_selector),
        skip_rows: args
            .skip_rows
            .unwrap_or_else(|| args.report.default_skip_rows()),
    };
    info!(input = ?args.input, report = args.report.title(), "Loading export");
    let table = reader::load_table(&args.input, &options)?;

    let params = ReportParams {
        club: args.club.clone(),
        reference,
        date_policy: if args.strict_dates {
            DatePolicy::Strict
        } else {
            DatePolicy::Lenient
        },
    };
    let result = reports::run(args.report, &table, &params, &config)?;
    if result.is_empty() {
        info!("Report matched no rows");
    } else {
        info!(rows = result.len(), "Report complete");
    }

    let csv_config = writer::CsvConfig {
        format: args.format,
        empty_value: args.empty.clone(),
    };

    match &args.output {
        None => {
            let stdout = io::stdout();
            let handle = stdout.lock();
            writer::write_table(&result, handle, &csv_config)?;
        }
        Some(path) => {
            let is_xlsx = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));

            if is_xlsx {
                writer::write_xlsx(&result, path, args.report.title())?;
            } else {
                let file = std::fs::File::create(path)?;
                writer::write_table(&result, file, &csv_config)?;
            }
            info!(output = ?path, "Report written");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["clubreport", "group-fitness", "gf.xlsx"]).unwrap();
        assert_eq!(args.report, ReportKind::GroupFitness);
        assert_eq!(args.club, DEFAULT_CLUB);
        assert!(args.date.is_none());
        assert!(args.skip_rows.is_none());
        assert_eq!(args.format.delimiter(), b',');
    }

    #[test]
    fn test_args_full() {
        let args = Args::try_parse_from([
            "clubreport",
            "new-members",
            "members.csv",
            "--club",
            "DeakinACTIVE Burwood",
            "--date",
            "2025-04-30",
            "--format",
            "european",
            "--skip-rows",
            "2",
        ])
        .unwrap();
        assert_eq!(args.report, ReportKind::NewMembers);
        assert_eq!(args.club, "DeakinACTIVE Burwood");
        assert_eq!(args.date.as_deref(), Some("2025-04-30"));
        assert_eq!(args.skip_rows, Some(2));
        assert_eq!(args.format.delimiter(), b';');
    }

    #[test]
    fn test_bad_reference_date_fails_before_loading() {
        let args = Args::try_parse_from([
            "clubreport",
            "current-members",
            "/nonexistent/members.xlsx",
            "--date",
            "30/04/2025",
        ])
        .unwrap();
        let err = run(args).unwrap_err();
        assert!(matches!(err, error::Error::UnparseableReferenceDate(_)));
        assert_eq!(err.exit_code(), 3);
    }
}
