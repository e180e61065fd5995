use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use profitability_core::allocation::{plan_allocation, AllocationConfig, Period};
use profitability_core::Month;

use crate::input;

/// Arguments for the daily management-time allocation
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to the revenue/cost sheet (.csv, .xlsx, .json)
    #[arg(long)]
    pub input: Option<String>,

    /// Year of the period to plan (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month of the period to plan, e.g. Mar (defaults to the current month)
    #[arg(long)]
    pub month: Option<Month>,

    /// JSON or YAML file with allocation parameters
    #[arg(long)]
    pub config: Option<String>,

    /// Hours to distribute per day (multiple of 0.5)
    #[arg(long)]
    pub budget_hours: Option<Decimal>,

    /// Standard daily cost of management time
    #[arg(long)]
    pub cost_per_day: Option<Decimal>,

    /// Minimum margin for a project to receive hours
    #[arg(long, conflicts_with = "no_min_margin")]
    pub min_margin: Option<Decimal>,

    /// Admit every project with positive revenue
    #[arg(long)]
    pub no_min_margin: bool,

    /// Omit the "days supported" column
    #[arg(long)]
    pub no_days_supported: bool,
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;
    let dataset = input::load_dataset(args.input.as_deref())?;

    let today = Period::current();
    let period = Period::new(
        args.year.unwrap_or(today.year),
        args.month.unwrap_or(today.month),
    );
    debug!(year = period.year, month = %period.month, "planning allocation");

    let result = plan_allocation(&dataset, period, &config)?;
    Ok(serde_json::to_value(result)?)
}

/// Config file first, then individual flags on top.
fn resolve_config(args: &AllocateArgs) -> Result<AllocationConfig, Box<dyn std::error::Error>> {
    let mut config: AllocationConfig = match &args.config {
        Some(path) => input::file::read_config(path)?,
        None => AllocationConfig::default(),
    };

    if let Some(hours) = args.budget_hours {
        config.total_budget_hours = hours;
    }
    if let Some(cost) = args.cost_per_day {
        config.cost_per_day = cost;
    }
    if args.no_min_margin {
        config.min_margin_threshold = None;
    } else if let Some(threshold) = args.min_margin {
        config.min_margin_threshold = Some(threshold);
    }
    if args.no_days_supported {
        config.include_days_supported = false;
    }

    config.validate()?;
    Ok(config)
}
