//! Lease appraisal CLI
//!
//! Projects a single lease and prints its timeline and return metrics

use anyhow::{bail, Context, Result};
use clap::Parser;
use lease_appraisal::{
    dates::parse_date,
    lease::{resolve_assumptions, CachedBusinessPlans, CsvBusinessPlans},
    AppraisalConfig, AppraisalSession, LeaseAssumptions,
};
use log::info;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lease_appraisal",
    version = env!("CARGO_PKG_VERSION"),
    about = "Project monthly cashflows for a commercial lease and report NPV, IRR and valuations"
)]
struct Cli {
    /// JSON file of lease assumptions
    #[arg(long, conflicts_with_all = ["property", "unit"])]
    assumptions: Option<PathBuf>,

    /// Property to look up in the business plans
    #[arg(long, requires = "unit")]
    property: Option<String>,

    /// Unit within the property
    #[arg(long, requires = "property")]
    unit: Option<String>,

    /// Business plans CSV (overrides BUSINESS_PLANS_PATH)
    #[arg(long)]
    plans: Option<PathBuf>,

    /// Cashflow start date for looked-up units (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Projection length in months for looked-up units
    #[arg(long, default_value_t = 60)]
    term: u32,

    /// Annual discount rate (overrides DISCOUNT_RATE)
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Entry price paid on acquisition
    #[arg(long)]
    entry_price: Option<f64>,

    /// Exit price (overrides the assumptions file); derived from the relet
    /// rent and exit cap when neither sets one
    #[arg(long)]
    exit_price: Option<f64>,

    /// Timeline CSV path (overrides CASHFLOW_OUTPUT_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the full appraisal as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Timeline rows to print
    #[arg(long, default_value_t = 24)]
    rows: usize,
}

fn load_assumptions(cli: &Cli, config: &AppraisalConfig) -> Result<(LeaseAssumptions, Vec<String>)> {
    if let Some(path) = &cli.assumptions {
        let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
        let assumptions: LeaseAssumptions =
            serde_json::from_reader(file).with_context(|| format!("Invalid assumptions in {}", path.display()))?;
        return Ok((assumptions, Vec::new()));
    }

    let (Some(property), Some(unit)) = (&cli.property, &cli.unit) else {
        return Ok((LeaseAssumptions::default_pricing(), Vec::new()));
    };

    let plans_path = cli.plans.clone().unwrap_or_else(|| config.business_plans_path.clone());
    let plans = CsvBusinessPlans::from_path(&plans_path)
        .with_context(|| format!("Unable to load business plans from {}", plans_path.display()))?;
    let source = CachedBusinessPlans::new(plans);

    let start = match &cli.start {
        Some(s) => parse_date("start", s)?,
        None => LeaseAssumptions::default_pricing().cashflow_start,
    };

    Ok(resolve_assumptions(&source, property, unit, start, cli.term)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = AppraisalConfig::from_env();
    if let Some(rate) = cli.discount_rate {
        config.discount_rate = rate;
    }
    if let Some(path) = &cli.output {
        config.cashflow_output_path = path.clone();
    }

    let (mut assumptions, mut warnings) = load_assumptions(&cli, &config)?;
    if let Some(price) = cli.entry_price {
        assumptions.entry_price = price;
    }
    if assumptions.cashflow_term == 0 {
        bail!("Projection term must be at least one month");
    }

    let mut session = AppraisalSession::new();
    let mut appraisal = session.update(&assumptions, cli.exit_price, &config)?;
    warnings.append(&mut appraisal.warnings);
    appraisal.warnings = warnings;

    let csv_path = &config.cashflow_output_path;
    let file = File::create(csv_path).with_context(|| format!("Unable to create {}", csv_path.display()))?;
    appraisal.timeline.write_csv(file)?;
    info!("Timeline written to {}", csv_path.display());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&appraisal)?);
        return Ok(());
    }

    println!("Lease Appraisal v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    let a = &appraisal.assumptions;
    println!("Cashflow start: {}  Term: {} months", a.cashflow_start, a.cashflow_term);
    println!("  Unit area:        {:.0} sq ft", a.unit_area);
    println!("  Current rent:     {:.2}", a.current_rent);
    println!("  Review date:      {}", a.review_date);
    println!("  Termination:      {}", a.lease_termination);
    println!("  Entry / exit:     {:.0} / {:.0}", a.entry_price, a.exit_price.unwrap_or(0.0));
    println!();

    println!("Timeline ({} rows):", appraisal.timeline.len());
    println!(
        "{:>5} {:>11} {:>11} {:>22} {:>14} {:>14}",
        "Month", "Start", "End", "Category", "Cashflow", "Line"
    );
    println!("{}", "-".repeat(82));

    for row in appraisal.timeline.periods.iter().take(cli.rows) {
        println!(
            "{:>5} {:>11} {:>11} {:>22} {:>14.2} {:>14.2}",
            row.month,
            row.period_start,
            row.period_end,
            row.category.map(|c| c.as_str()).unwrap_or("-"),
            row.cashflow,
            row.cashflow_line,
        );
    }
    if appraisal.timeline.len() > cli.rows {
        println!("... ({} more rows)", appraisal.timeline.len() - cli.rows);
    }

    let summary = &appraisal.summary;
    println!("\nSummary:");
    println!("  Contracted rent:  {:>14.2}", summary.total_contracted_rent);
    println!("  Reviewed rent:    {:>14.2}", summary.total_reviewed_rent);
    println!("  Refurbishment:    {:>14.2}", summary.total_refurbishment);
    println!("  Void costs:       {:>14.2}", summary.total_void);
    println!("  Relet rent:       {:>14.2}", summary.total_relet_rent);
    println!("  Net cashflow:     {:>14.2}", summary.net_cashflow);

    println!("\nReturns at {:.2}% discount rate:", appraisal.discount_rate * 100.0);
    println!("  NPV:              {:>14.2}", appraisal.npv);
    println!("  IRR:              {:>14}", appraisal.irr_display());
    if let Some(value) = appraisal.initial_yield_value {
        println!("  Initial yield:    {:>14.0}", value);
    }
    if let Some(value) = appraisal.dcf_value {
        println!("  Term & reversion: {:>14.0}", value);
    }

    for warning in &appraisal.warnings {
        println!("Warning: {}", warning);
    }

    println!("\nFull timeline written to {}", csv_path.display());
    Ok(())
}
