//! CLI entry point for the grade placement tool.
//!
//! Loads the class data once, then either runs the interactive menu or a
//! single subcommand against the finished record store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grade_placement::chart::save_chart;
use grade_placement::menu::Menu;
use grade_placement::output::{export_csv, export_path, write_json, write_record};
use grade_placement::store::pick as pick_listed;
use grade_placement::summary::{SummaryReport, summarize};
use grade_placement::{DEFAULT_CORE_SUBJECTS, NameMatch, RecordStore, Subject, load_data};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_placement")]
#[command(
    about = "Aggregates 4th-grade grades and assigns each pupil a secondary school",
    long_about = None
)]
struct Cli {
    /// Directory containing student_data.csv and grades_<subject>.csv
    #[arg(short = 'd', long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Comma-separated subjects whose averages decide the school
    #[arg(short, long, value_delimiter = ',', global = true)]
    core: Vec<Subject>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu {
        /// File name used by the "Save CSV file" entry
        #[arg(short, long, default_value = "output")]
        name: String,
    },
    /// Print every record
    Show {
        /// Print JSON instead of key/value lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write all records to <NAME>.csv
    Export {
        #[arg(short, long, default_value = "output")]
        name: String,
    },
    /// Look up a pupil by student ID
    Lookup {
        #[arg(value_name = "SID")]
        sid: String,
    },
    /// Search pupils by (part of) their last name
    Search {
        #[arg(value_name = "LASTNAME")]
        name: String,

        /// Number of the record to show when several match
        #[arg(short, long)]
        pick: Option<usize>,
    },
    /// Save a bar chart of schools per section (pdf, png or jpg)
    Chart {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print pupil counts per section and school as JSON
    Summary,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/grade_placement.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_placement.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let core = if cli.core.is_empty() {
        DEFAULT_CORE_SUBJECTS.to_vec()
    } else {
        cli.core
    };
    info!(data_dir = %cli.data_dir.display(), ?core, "Loading class data");

    let store = load_data(&cli.data_dir, &core)
        .with_context(|| format!("loading class data from {}", cli.data_dir.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::Menu {
        name: "output".to_string(),
    }) {
        Commands::Menu { name } => {
            let stdin = std::io::stdin();
            Menu::new(&store, &export_path(&name), stdin.lock(), &mut out).run()?;
        }
        Commands::Show { json } => {
            if json {
                write_json(&mut out, &store)?;
            } else {
                for record in store.records() {
                    write_record(&mut out, record)?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Export { name } => {
            export_csv(&export_path(&name), &store)?;
        }
        Commands::Lookup { sid } => match store.get_by_id(&sid) {
            Ok(record) => write_record(&mut out, record)?,
            Err(e) => warn!(error = %e, "Lookup failed"),
        },
        Commands::Search { name, pick } => search(&store, &name, pick, &mut out)?,
        Commands::Chart { file } => {
            save_chart(&summarize(&store), &file)?;
        }
        Commands::Summary => {
            serde_json::to_writer_pretty(&mut out, &SummaryReport::from_store(&store))?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Non-interactive last-name search; several matches need `--pick`.
fn search<W: Write>(store: &RecordStore, name: &str, pick: Option<usize>, out: &mut W) -> Result<()> {
    match store.find_by_last_name(name) {
        NameMatch::None => warn!(query = name, "No entries found"),
        NameMatch::One(record) => write_record(out, record)?,
        NameMatch::Many(records) => match pick {
            Some(choice) => match pick_listed(&records, choice) {
                Some(record) => write_record(out, record)?,
                None => warn!(choice, "Pick is not a listed record number"),
            },
            None => {
                for (i, record) in records.iter().enumerate() {
                    writeln!(
                        out,
                        "{}. {} {} {}",
                        i + 1,
                        record.last_name(),
                        record.first_name(),
                        record.sid()
                    )?;
                }
                info!(matches = records.len(), "Several records match, rerun with --pick <N>");
            }
        },
    }
    Ok(())
}
