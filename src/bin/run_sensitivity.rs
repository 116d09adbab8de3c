//! Exit yield x discount rate sensitivity grid for one lease
//!
//! Outputs NPV and IRR per grid cell to CSV

use anyhow::{Context, Result};
use clap::Parser;
use lease_appraisal::{AppraisalConfig, LeaseAssumptions, ScenarioRunner};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "run_sensitivity", about = "NPV/IRR grid over exit yields and discount rates")]
struct Args {
    /// JSON file of lease assumptions (built-in defaults when omitted)
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Exit yields to test
    #[arg(long, value_delimiter = ',', default_values_t = [0.05, 0.055, 0.06, 0.065, 0.07])]
    exit_yields: Vec<f64>,

    /// Discount rates to test
    #[arg(long, value_delimiter = ',', default_values_t = [0.06, 0.07, 0.08, 0.09, 0.10])]
    rates: Vec<f64>,

    /// Entry price (overrides the assumptions)
    #[arg(long)]
    entry_price: Option<f64>,

    #[arg(long, default_value = "sensitivity_output.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();

    let mut assumptions: LeaseAssumptions = match &args.assumptions {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("Invalid assumptions in {}", path.display()))?
        }
        None => LeaseAssumptions::default_pricing(),
    };
    if let Some(price) = args.entry_price {
        assumptions.entry_price = price;
    }

    let runner = ScenarioRunner::new(assumptions, AppraisalConfig::from_env());

    println!(
        "Running {} x {} sensitivity grid...",
        args.exit_yields.len(),
        args.rates.len()
    );
    let grid = runner.exit_yield_grid(&args.exit_yields, &args.rates)?;
    println!("Grid complete in {:?}", start.elapsed());

    let file = File::create(&args.output).with_context(|| format!("Unable to create {}", args.output.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for point in &grid {
        writer.serialize(point)?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());

    println!("\nNPV by exit yield (rows) and discount rate (columns):");
    print!("{:>8}", "");
    for rate in &args.rates {
        print!(" {:>14}", format!("{:.2}%", rate * 100.0));
    }
    println!();
    for row in grid.chunks(args.rates.len().max(1)) {
        print!("{:>8}", format!("{:.2}%", row[0].exit_yield * 100.0));
        for point in row {
            print!(" {:>14.0}", point.npv);
        }
        println!();
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
