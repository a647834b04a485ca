//! Timeclerk CLI
//!
//! Thin front end over the `timeclerk` library: keeps a local record of
//! desired hours per day and category, and drives submission passes that
//! reconcile that record against the hosted timecard application.
//!
//! Credentials and endpoints come from the environment (a `.env` file works
//! during development):
//!   TIMECLERK_EMAIL, TIMECLERK_PASSWORD, TIMECLERK_BASE_URL,
//!   TIMECLERK_WEBDRIVER_URL (defaults to a local chromedriver)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use timeclerk::{DateKey, SubmissionOrchestrator, TimecardConfig, WebDriverAdapter};

mod record;

use record::HoursRecord;

#[derive(Parser)]
#[command(name = "timeclerk")]
#[command(about = "Reconcile locally recorded hours against a hosted timecard application")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the billable categories on the currently open timesheet
    Categories,
    /// Submit recorded hours, performing only the minimal remote edits
    Submit(SubmitArgs),
    /// Set hours for a date and category in the local record
    Set(SetArgs),
}

#[derive(Args)]
struct SubmitArgs {
    /// Path to the local hours record
    #[arg(long, default_value = "timesheet.json")]
    record: PathBuf,

    /// Only submit entries for this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args)]
struct SetArgs {
    /// Path to the local hours record
    #[arg(long, default_value = "timesheet.json")]
    record: PathBuf,

    /// The date to record hours for (YYYY-MM-DD)
    date: String,

    /// The category label exactly as the timesheet shows it
    category: String,

    /// Desired hours for that date and category
    hours: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Categories => categories().await,
        Commands::Submit(args) => submit(args).await,
        Commands::Set(args) => set(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn build_orchestrator() -> SubmissionOrchestrator {
    let config = TimecardConfig::from_env();
    let adapter = Arc::new(WebDriverAdapter::new(&config.webdriver_url));
    SubmissionOrchestrator::new(adapter, config)
}

async fn categories() -> Result<()> {
    let categories = build_orchestrator().categories().await?;
    if categories.is_empty() {
        println!("No categories found on the open timesheet.");
        return Ok(());
    }
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

async fn submit(args: SubmitArgs) -> Result<()> {
    let record = HoursRecord::load(&args.record)?;
    let entries = match &args.date {
        Some(date) => record.entries_for(DateKey::parse(date)?),
        None => record.all_entries(),
    };
    if entries.is_empty() {
        println!("Nothing to submit.");
        return Ok(());
    }

    info!(entries = entries.len(), "starting submission pass");
    let report = build_orchestrator().submit(&entries).await?;

    println!("{report}");
    for failure in &report.failures {
        eprintln!("  {} on {}: {}", failure.category, failure.date, failure.cause);
    }
    if !report.is_clean() {
        bail!("{} of {} entries failed", report.failed, entries.len());
    }
    Ok(())
}

fn set(args: SetArgs) -> Result<()> {
    let date = DateKey::parse(&args.date)?;
    let mut record = HoursRecord::load_or_default(&args.record)?;
    record.set(date, &args.category, args.hours)?;
    record.save(&args.record)?;
    println!("{} {}: {} hours", date, args.category, args.hours);
    Ok(())
}
