use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::DEFAULT_START_DATE;

#[derive(Parser)]
#[command(name = "brvm-analysis")]
#[command(about = "BRVM market data pipeline: scrape, analyze, report", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the listing and every security's price history into the data directory
    Fetch {
        /// First date of the historical window (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start_date: String,

        /// Last date of the historical window (defaults to today)
        #[arg(long)]
        end_date: Option<String>,

        /// Fetch only these tickers, skipping the listing (debug aid)
        #[arg(long, value_delimiter = ',')]
        tickers: Option<Vec<String>>,

        /// Skip the per-security dividend pages (faster runs)
        #[arg(long)]
        skip_dividends: bool,
    },
    /// Compute and print the performance metrics from the on-disk CSVs
    Analyze,
    /// Render exports from the on-disk CSVs
    Export {
        /// all, excel, pdf or html
        #[arg(long, default_value = "all")]
        format: String,
    },
    /// Copy the dashboard into the published site and commit it
    Publish,
    /// Full pipeline: fetch, analyze, export, publish
    Run {
        /// First date of the historical window (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start_date: String,

        /// Reuse the on-disk CSVs instead of fetching
        #[arg(long)]
        skip_fetch: bool,
    },
    /// Show current status of the data directory
    Status,
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            start_date,
            end_date,
            tickers,
            skip_dividends,
        } => {
            commands::fetch::run(start_date, end_date, tickers, skip_dividends);
        }
        Commands::Analyze => {
            commands::analyze::run();
        }
        Commands::Export { format } => {
            commands::export::run(format);
        }
        Commands::Publish => {
            commands::publish::run();
        }
        Commands::Run {
            start_date,
            skip_fetch,
        } => {
            commands::run::run(start_date, skip_fetch);
        }
        Commands::Status => {
            commands::status::run();
        }
    }
}
