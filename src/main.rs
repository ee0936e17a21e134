//! パレットトラッカー - メインエントリポイント

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pallet_tracker::credentials::provider_for;
use pallet_tracker::pipeline::{locate_scan, reconcile_scan, RunReport};
use pallet_tracker::scan::Scan;
use pallet_tracker::AppConfig;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pallet_tracker")]
#[command(about = "Update pallet locations in the inventory sheet from scanned sheets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match the DE and A tables of a scan and write Location / Qty
    Reconcile(RunArgs),
    /// Write Location for every "code location" pair found in a scan
    Locate(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Scanned sheet (PDF or image)
    #[arg(default_value = "Xerox Scan.pdf")]
    scan: PathBuf,

    /// Show what would be written without touching the sheet
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // 環境変数の読み込み
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    pallet_tracker::logging::init(cli.verbose);

    let Some(command) = cli.command else {
        // GUIアプリケーション起動
        return pallet_tracker::gui::run();
    };

    // SHEET_ID がなければ何もせずに終了
    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Runtime::new().context("Tokioランタイムの作成に失敗")?;

    match command {
        Command::Reconcile(args) => {
            let scan = Scan::read(&args.scan)?;
            let provider = provider_for(&config.credentials);
            let report = runtime.block_on(reconcile_scan(
                provider.as_ref(),
                &config,
                &scan,
                args.dry_run,
            ))?;
            print_report(&report, &args, |u| {
                format!("{}\t{}\t{}", u.product, u.location, u.qty)
            })
        }
        Command::Locate(args) => {
            let scan = Scan::read(&args.scan)?;
            let provider = provider_for(&config.credentials);
            let report = runtime.block_on(locate_scan(
                provider.as_ref(),
                &config,
                &scan,
                args.dry_run,
            ))?;
            print_report(&report, &args, |p| format!("{}\t{}", p.product, p.location))
        }
    }
}

fn print_report<T, F>(report: &RunReport<T>, args: &RunArgs, line: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.entries.is_empty() {
        println!("No updates found");
        return Ok(());
    }

    for entry in &report.entries {
        println!("{}", line(entry));
    }

    match &report.outcome {
        Some(outcome) => {
            for code in &outcome.skipped {
                println!("SKIP: {} not found in sheet", code);
            }
            println!("Updated {} rows.", outcome.updated.len());
        }
        None => println!("Dry run: {} rows not written.", report.entries.len()),
    }

    Ok(())
}
