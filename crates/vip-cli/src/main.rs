//! Scheduled job that keeps the forum VIP group in line with user balances.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use forum_libsql::Database;
use forum_vip::{DemotionPolicy, Reconciler, RunMode, RunReport, Summary, Thresholds};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database could not be opened
    #[error("failed to open database: {0}")]
    Database(#[from] forum_libsql::Error),

    /// Reconciliation failed
    #[error(transparent)]
    Reconcile(#[from] forum_vip::Error<forum_libsql::Error>),

    /// Report could not be serialized
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Forum database file
    #[arg(long, default_value = "forum.db", env = "FORUM_VIP_DATABASE")]
    database: PathBuf,

    /// Group granted to users at or above the promotion amount
    #[arg(long, default_value_t = 4, env = "FORUM_VIP_PROMOTION_GROUP_ID")]
    promotion_group_id: i64,

    /// Group demoted users join when the demotion policy is `move`
    #[arg(long, default_value_t = 3, env = "FORUM_VIP_DEMOTION_GROUP_ID")]
    demotion_group_id: i64,

    /// Balance at or above which users are promoted
    #[arg(long, default_value_t = 500.0, env = "FORUM_VIP_PROMOTION_AMOUNT")]
    promotion_amount: f64,

    /// Balance below which members are demoted
    #[arg(long, default_value_t = 100.0, env = "FORUM_VIP_DEMOTION_AMOUNT")]
    demotion_amount: f64,

    /// `remove` drops the VIP group only, `move` also swaps in the demotion group
    #[arg(long, default_value_t = DemotionPolicy::Remove, env = "FORUM_VIP_DEMOTION_POLICY")]
    demotion_policy: DemotionPolicy,

    /// Compute and report changes without applying them
    #[arg(long)]
    dry_run: bool,

    /// Only report aggregate counts (takes precedence over --dry-run)
    #[arg(long)]
    stats: bool,

    /// List affected usernames and balances
    #[arg(short, long, visible_alias = "detailed")]
    verbose: bool,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

impl Args {
    const fn mode(&self) -> RunMode {
        if self.stats {
            RunMode::Stats
        } else if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Apply
        }
    }

    const fn thresholds(&self) -> Thresholds {
        Thresholds {
            promotion_group_id: self.promotion_group_id,
            demotion_group_id: self.demotion_group_id,
            promotion_amount: self.promotion_amount,
            demotion_amount: self.demotion_amount,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args) -> Result<RunReport, Error> {
    let database = Database::open_existing(&args.database).await?;
    let reconciler = Reconciler::new(database, args.thresholds(), args.demotion_policy)?;

    Ok(reconciler.run(args.mode(), args.verbose).await?)
}

fn render(report: &RunReport, json: bool) -> Result<String, Error> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.to_string())
    }
}

const fn exit_status<T>(result: &Result<T, Error>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    info!(database = %args.database.display(), "opening forum database");

    let result = run(&args)
        .await
        .and_then(|report| render(&report, args.json));
    let status = exit_status(&result);

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!(error = %e, "VIP reconciliation failed");

            if args.json {
                if let Ok(output) = serde_json::to_string_pretty(&Summary::failed(&e)) {
                    println!("{output}");
                }
            }
        }
    }

    ExitCode::from(status)
}
