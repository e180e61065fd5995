mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::allocate::AllocateArgs;
use commands::options::OptionsArgs;
use commands::report::ReportArgs;

/// Project profitability analysis and management-time allocation
#[derive(Parser)]
#[command(
    name = "rentab",
    version,
    about = "Project profitability analysis and management-time allocation",
    long_about = "Reads a monthly revenue/cost sheet per client and project, reports \
                  profitability on summed totals, and splits a daily management-time \
                  budget across the month's projects in half-hour slots."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Profitability table and totals for a selection
    Report(ReportArgs),
    /// Split the daily budget across a month's projects
    Allocate(AllocateArgs),
    /// List the years, months, clients and projects available as filters
    Options(OptionsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Report(args) => commands::report::run_report(args),
        Commands::Allocate(args) => commands::allocate::run_allocate(args),
        Commands::Options(args) => commands::options::run_options(args),
        Commands::Version => {
            println!("rentab {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
