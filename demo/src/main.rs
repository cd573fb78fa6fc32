//! VIGIL — Demo CLI
//!
//! Runs one or all of the four demo scenarios. Each scenario wires real
//! VIGIL components (signed ledger, fraud engine, event recorder, alert
//! dispatcher) together with mock storefront traffic.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- checkout
//!   cargo run -p demo -- brute-force
//!   cargo run -p demo -- tamper
//!   cargo run -p demo -- metrics

mod scenarios;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scenarios::{brute_force, checkout, metrics, tamper};

// ── CLI definition ────────────────────────────────────────────────────────────

/// VIGIL — tamper-evident audit ledger with fraud detection.
///
/// Each subcommand runs one or all of the storefront scenarios,
/// demonstrating fraud screening, alerting, and chain integrity.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "VIGIL audit ledger and fraud detection demo",
    long_about = "Runs VIGIL demo scenarios showing checkout fraud screening,\n\
                  brute-force detection, tamper evidence, and security metrics."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four scenarios in sequence.
    RunAll,
    /// Scenario 1: Checkout fraud screening (high-value + velocity rules).
    Checkout,
    /// Scenario 2: Brute-force login detection and alerting.
    BruteForce,
    /// Scenario 3: Tamper evidence (immutability + chain verification).
    Tamper,
    /// Scenario 4: Security metrics rollup over a traffic window.
    Metrics,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Checkout => checkout::run_scenario(),
        Command::BruteForce => brute_force::run_scenario(),
        Command::Tamper => tamper::run_scenario(),
        Command::Metrics => metrics::run_scenario(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> vigil_contracts::error::VigilResult<()> {
    checkout::run_scenario()?;
    brute_force::run_scenario()?;
    tamper::run_scenario()?;
    metrics::run_scenario()?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("VIGIL — Tamper-Evident Audit Ledger");
    println!("Storefront Fraud Demo");
    println!("===================================");
    println!();
    println!("Per recorded event:");
    println!("  [1] Business layer calls a log_* helper with the event's facts");
    println!("  [2] Recorder assigns a baseline risk score for the category");
    println!("  [3] Ledger signs the entry (HMAC-SHA256) and links it to the chain");
    println!("  [4] Score >= 70 logs a warning; >= 80 dispatches a critical alert");
    println!("  [5] Fraud checks screen orders, payments, and logins against history");
    println!();
}
