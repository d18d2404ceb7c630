//! ledger-migrate CLI - migrate owners, units and payments between GraphQL datastores.

use clap::{Parser, Subcommand};
use ledger_migrate::{
    ChannelSink, Config, MigrateError, MigrationResult, Orchestrator, Progress, ProgressEvent,
    Session, StepOutcome, VerifyOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

/// A step was refused (for example, the source has no owners).
const EXIT_REFUSED: u8 = 1;
/// Verification found discrepancies.
const EXIT_INCOMPLETE: u8 = 6;
/// Health check could not reach an endpoint.
const EXIT_UNHEALTHY: u8 = 3;

#[derive(Parser)]
#[command(name = "ledger-migrate")]
#[command(about = "Migrate owners, units and payments into profiles, properties and payments")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Print progress updates as JSON lines to stderr
    #[arg(long)]
    progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the source, clear and load the target, then verify
    Run {
        /// Skip sampled verification after loading
        #[arg(long)]
        skip_verify: bool,
    },

    /// Delete every profile, property and payment in the target
    Clear,

    /// Test connectivity to both endpoints
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<u8, MigrateError> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format).map_err(MigrateError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let session = Session::from_config(&config);

    match cli.command {
        Commands::Run { skip_verify } => {
            let (progress, printer) = progress_printer(cli.progress);
            let mut orchestrator = Orchestrator::new(session, config.migration).with_progress(progress);

            let outcome = orchestrator.run(skip_verify).await;
            drop(orchestrator);
            finish_printer(printer).await;

            match outcome? {
                StepOutcome::Completed(result) => {
                    print_result(&result, cli.output_json)?;
                    if result.verification == Some(VerifyOutcome::Incomplete) {
                        return Ok(EXIT_INCOMPLETE);
                    }
                }
                StepOutcome::Refused(reason) => {
                    eprintln!("Migration stopped: {}", reason);
                    return Ok(EXIT_REFUSED);
                }
            }
        }

        Commands::Clear => {
            let (progress, printer) = progress_printer(cli.progress);
            let mut orchestrator = Orchestrator::new(session, config.migration).with_progress(progress);

            let outcome = orchestrator.clear_target().await;
            drop(orchestrator);
            finish_printer(printer).await;

            let report = outcome?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Target cleared!");
                println!("  Payments deleted: {}", report.payments.succeeded);
                println!("  Properties deleted: {}", report.properties.succeeded);
                println!("  Profiles deleted: {}", report.profiles.succeeded);
                if report.failed() > 0 {
                    println!("  Failed deletes: {}", report.failed());
                }
            }
        }

        Commands::HealthCheck => {
            let result = session.health_check().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source ({}): {} ({}ms)",
                    config.source.endpoint,
                    if result.source_connected { "OK" } else { "FAILED" },
                    result.source_latency_ms
                );
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Target ({}): {} ({}ms)",
                    config.target.endpoint,
                    if result.target_connected { "OK" } else { "FAILED" },
                    result.target_latency_ms
                );
                if let Some(ref err) = result.target_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.healthy {
                return Ok(EXIT_UNHEALTHY);
            }
        }
    }

    Ok(0)
}

fn print_result(result: &MigrationResult, output_json: bool) -> Result<(), MigrateError> {
    if output_json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!("\nMigration completed!");
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    if let Some(source) = result.source {
        println!(
            "  Source: {} owners, {} units, {} payments",
            source.owners, source.units, source.payments
        );
    }
    println!("  Target rows deleted: {}", result.records_deleted);
    if let Some(load) = result.load {
        println!(
            "  Profiles: {} created, {} failed",
            load.profiles.created, load.profiles.failed
        );
        println!(
            "  Properties: {} created, {} failed, {} skipped",
            load.properties.created, load.properties.failed, load.properties.skipped
        );
        println!(
            "  Payments: {} created, {} failed, {} skipped",
            load.payments.created, load.payments.failed, load.payments.skipped
        );
    }
    match result.verification {
        Some(outcome) => println!(
            "  Verification: {} ({} discrepancies)",
            outcome, result.discrepancies
        ),
        None => println!("  Verification: skipped"),
    }
    Ok(())
}

/// Progress handle that streams events as JSON lines to stderr when enabled.
fn progress_printer(enabled: bool) -> (Progress, Option<JoinHandle<()>>) {
    if !enabled {
        return (Progress::silent(), None);
    }

    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(1024);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(line) = serde_json::to_string(&event) {
                eprintln!("{}", line);
            }
        }
    });
    (Progress::new(Arc::new(ChannelSink::new(tx))), Some(printer))
}

/// Wait for queued progress lines once every sender is dropped.
async fn finish_printer(printer: Option<JoinHandle<()>>) {
    if let Some(printer) = printer {
        let _ = printer.await;
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
