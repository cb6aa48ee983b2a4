//! StopLab CLI — run scenario files and fuzz sweeps.
//!
//! Commands:
//! - `run` — execute a TOML scenario and print the final stop-order table
//! - `fuzz` — run the randomized invariant sweep across parallel markets

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stoplab_runner::fuzz::{run_fuzz, FuzzConfig};
use stoplab_runner::report::{render_table, write_audit_csv, write_rows_csv};
use stoplab_runner::scenario::{load_scenario, run_scenario};

#[derive(Parser)]
#[command(name = "stoplab", about = "StopLab CLI — stop-order engine scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a TOML scenario file and print the final stop-order table.
    Run {
        /// Path to the scenario file.
        scenario: PathBuf,

        /// Directory for CSV reports (stop_orders.csv, audit.csv).
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Run the randomized invariant sweep.
    Fuzz {
        /// Master seed; each market derives its own stream from it.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Ticks per market.
        #[arg(long, default_value_t = 500)]
        ticks: usize,

        /// Markets swept in parallel.
        #[arg(long, default_value_t = 4)]
        markets: usize,

        /// Parties per market.
        #[arg(long, default_value_t = 3)]
        parties: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            report_dir,
        } => {
            let loaded = load_scenario(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let run = run_scenario(&loaded).context("running scenario")?;

            if !run.report.name.is_empty() {
                println!("Scenario: {}", run.report.name);
            }
            print!("{}", render_table(&run.report.rows));
            println!(
                "{} stop orders, {} transitions, {} venue orders",
                run.report.rows.len(),
                run.report.audit.len(),
                run.venue.accepted().len()
            );

            if let Some(dir) = report_dir {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
                write_rows_csv(&run.report.rows, &dir.join("stop_orders.csv"))?;
                write_audit_csv(&run.report.audit, &dir.join("audit.csv"))?;
                run.report.write_json(&dir.join("report.json"))?;
                println!("Reports written to {}", dir.display());
            }
        }
        Commands::Fuzz {
            seed,
            ticks,
            markets,
            parties,
        } => {
            let config = FuzzConfig {
                master_seed: seed,
                markets,
                parties,
                ticks,
                ..FuzzConfig::default()
            };
            let summary = run_fuzz(&config);

            for market in &summary.markets {
                println!(
                    "{}: {} submissions ({} OCO pairs), {} resolved, {} cancel attempts",
                    market.market,
                    market.submissions,
                    market.oco_pairs,
                    market.resolved,
                    market.cancel_attempts
                );
            }

            if !summary.is_clean() {
                for violation in summary.violations() {
                    eprintln!("violation: {violation}");
                }
                bail!("fuzz sweep found {} violations", summary.violations().len());
            }
            println!(
                "clean sweep: {} submissions, {} resolutions",
                summary.total_submissions(),
                summary.total_resolved()
            );
        }
    }

    Ok(())
}
