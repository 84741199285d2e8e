use anyhow::Result;
use clap::Parser;
use mechanic_shop::adapters::render;
use mechanic_shop::domain::model::{OutputFormat, ResultSet};
use mechanic_shop::domain::ports::DataStore;
use mechanic_shop::utils::logger;
use mechanic_shop::{Report, ReportEngine, ShopError, SqliteStore, StoreOptions};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Parser)]
#[command(name = "shop-report")]
#[command(about = "Run the canned shop reports without the interactive menu")]
struct Args {
    /// SQLite database file (opened read-only)
    database: String,

    /// Report to run (bill-under-100, more-than-20-cars, old-low-mileage, most-serviced, total-bill) or "all"
    #[arg(short, long, default_value = "all")]
    report: String,

    /// Output format
    #[arg(long, value_enum, default_value = "tsv")]
    format: OutputFormat,

    /// Emit logs as JSON on stderr
    #[arg(long)]
    log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn selected_reports(name: &str) -> Result<Vec<Report>, String> {
    if name.trim().eq_ignore_ascii_case("all") {
        return Ok(Report::ALL.to_vec());
    }
    name.parse::<Report>().map(|r| vec![r])
}

fn run_reports<S: DataStore>(
    store: &S,
    reports: &[Report],
) -> Result<BTreeMap<&'static str, ResultSet>, ShopError> {
    let engine = ReportEngine::new(store);
    let mut results = BTreeMap::new();
    for report in reports {
        results.insert(report.slug(), engine.run(*report)?);
    }
    Ok(results)
}

fn write_reports<W: Write>(
    out: &mut W,
    format: OutputFormat,
    reports: &[Report],
    results: &BTreeMap<&'static str, ResultSet>,
) -> Result<(), ShopError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
        }
        OutputFormat::Tsv => {
            for report in reports {
                let Some(rows) = results.get(report.slug()) else {
                    continue;
                };
                writeln!(out, "# {}", report.title())?;
                render::write_tsv(&mut *out, rows)?;
                writeln!(out, "total row(s): {}", rows.len())?;
            }
        }
    }
    Ok(())
}

fn run(args: &Args, reports: &[Report]) -> Result<(), ShopError> {
    // 報表只讀取資料，路徑打錯時不建立新檔案
    let store = SqliteStore::open(&args.database, &StoreOptions::read_only())?;
    let results = run_reports(&store, reports)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_reports(&mut out, args.format, reports, &results)?;

    store.close()
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let reports = match selected_reports(&args.report) {
        Ok(reports) => reports,
        Err(message) => {
            eprintln!("❌ {}", message);
            std::process::exit(1);
        }
    };
    tracing::info!("📊 Running {} report(s) against {}", reports.len(), args.database);

    if let Err(e) = run(&args, &reports) {
        tracing::error!(
            "❌ Report run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code().max(1));
    }

    Ok(())
}
