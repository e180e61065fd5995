use clap::Args;
use serde_json::Value;

use profitability_core::report::available_filters;

use crate::input;

/// Arguments for listing filter values
#[derive(Args)]
pub struct OptionsArgs {
    /// Path to the revenue/cost sheet (.csv, .xlsx, .json)
    #[arg(long)]
    pub input: Option<String>,

    /// Restrict the month list to this year
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run_options(args: OptionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dataset = input::load_dataset(args.input.as_deref())?;
    let options = available_filters(&dataset, args.year);
    Ok(serde_json::to_value(options)?)
}
