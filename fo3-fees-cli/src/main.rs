//! FO3 Fees CLI
//!
//! Quote transfer fees and check transfer limits against a fee configuration
//! file. Results are printed to stdout as JSON; logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use fo3_fees::config::{CONFIG_PATH_ENV, DEFAULT_LIMITS_TIER};
use fo3_fees::{evaluate_limits, quote_transfer, FeeConfig, LimitCheckResult, SpendingTotals, TransferLimits};

#[derive(Parser, Debug)]
#[command(name = "fo3-fees")]
#[command(about = "FO3 wallet transfer fee quoting and limit checks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fee configuration file (defaults to $FO3_FEES_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quote the fee for a transfer
    Quote {
        /// Transfer amount
        #[arg(short, long)]
        amount: Decimal,
        /// Policy to quote with instead of the currently effective one
        #[arg(short, long)]
        policy: Option<Uuid>,
        /// Point in time used to pick the effective policy (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Check a transfer amount against a limits tier
    CheckLimits {
        /// Transfer amount
        #[arg(short, long)]
        amount: Decimal,
        /// Limits tier name
        #[arg(short, long, default_value = DEFAULT_LIMITS_TIER)]
        tier: String,
        /// Amount already transferred today
        #[arg(long, default_value = "0")]
        daily_spent: Decimal,
        /// Amount already transferred this week
        #[arg(long, default_value = "0")]
        weekly_spent: Decimal,
        /// Amount already transferred this month
        #[arg(long, default_value = "0")]
        monthly_spent: Decimal,
    },
    /// Load and validate the configuration file
    Validate,
}

#[derive(Debug, Serialize)]
struct LimitReport<'a> {
    tier: &'a str,
    amount: Decimal,
    result: LimitCheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    remaining: SpendingTotals,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    policies: usize,
    limit_tiers: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&str>) -> Result<FeeConfig> {
    match path {
        Some(path) => FeeConfig::from_file(path)
            .with_context(|| format!("Failed to load fee configuration from {}", path)),
        None => FeeConfig::from_env()
            .with_context(|| format!("No --config given and {} could not be loaded", CONFIG_PATH_ENV)),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Quote { amount, policy, at } => {
            let now = at.unwrap_or_else(Utc::now);
            let policy = match policy {
                Some(id) => config.policy(&id)?,
                None => config
                    .effective_policy(now)
                    .with_context(|| format!("No fee policy is effective at {}", now))?,
            };
            debug!(policy_id = %policy.id, "Quoting with policy {}", policy.fee_name);

            let quote = quote_transfer(policy, amount)?;
            print_json(&quote)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckLimits {
            amount,
            tier,
            daily_spent,
            weekly_spent,
            monthly_spent,
        } => {
            let limits = config.limits_for(&tier)?;
            let spent = SpendingTotals::new(daily_spent, weekly_spent, monthly_spent);
            let report = check_limits(&tier, limits, amount, &spent)?;
            print_json(&report)?;

            if report.result.is_allowed() {
                info!("Transfer of {} allowed for tier '{}'", amount, tier);
                Ok(ExitCode::SUCCESS)
            } else {
                warn!("Transfer of {} rejected for tier '{}'", amount, tier);
                Ok(ExitCode::from(2))
            }
        }
        Commands::Validate => {
            let mut limit_tiers: Vec<String> = config.limits.keys().cloned().collect();
            limit_tiers.sort();
            print_json(&ValidationReport {
                valid: true,
                policies: config.policies.len(),
                limit_tiers,
            })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check_limits<'a>(
    tier: &'a str,
    limits: &TransferLimits,
    amount: Decimal,
    spent: &SpendingTotals,
) -> Result<LimitReport<'a>> {
    let result = evaluate_limits(limits, amount, spent)?;
    Ok(LimitReport {
        tier,
        amount,
        result,
        message: result.violation().map(|reason| reason.describe(limits)),
        remaining: limits.remaining(spent),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}
