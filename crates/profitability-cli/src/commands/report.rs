use clap::Args;
use serde_json::Value;

use profitability_core::aggregation::{Choice, Selection};
use profitability_core::report::{analyze_profitability, available_filters};
use profitability_core::Month;

use crate::input;

/// Arguments for the profitability table
#[derive(Args)]
pub struct ReportArgs {
    /// Path to the revenue/cost sheet (.csv, .xlsx, .json)
    #[arg(long)]
    pub input: Option<String>,

    /// Year to report on (defaults to the most recent year in the sheet)
    #[arg(long, conflicts_with = "all_years")]
    pub year: Option<i32>,

    /// Report across every year in the sheet
    #[arg(long)]
    pub all_years: bool,

    /// Months to include, e.g. Jan,Fev ("Tudo" for all)
    #[arg(long, value_delimiter = ',')]
    pub months: Vec<String>,

    /// Clients to include ("Tudo" for all)
    #[arg(long, value_delimiter = ',')]
    pub clients: Vec<String>,

    /// Projects to include ("Tudo" for all)
    #[arg(long, value_delimiter = ',')]
    pub projects: Vec<String>,
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dataset = input::load_dataset(args.input.as_deref())?;

    let year = if args.all_years {
        None
    } else {
        args.year
            .or_else(|| available_filters(&dataset, None).years.first().copied())
    };

    let selection = Selection {
        year,
        months: Choice::<Month>::parse_labels(&args.months)?,
        clients: Choice::parse_labels(&args.clients)?,
        projects: Choice::parse_labels(&args.projects)?,
    };

    let result = analyze_profitability(&dataset, &selection)?;
    Ok(serde_json::to_value(result)?)
}
