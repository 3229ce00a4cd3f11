pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "salespulse",
    about = "Salespulse operator CLI",
    long_about = "Operate the salespulse forecasting store: migrations, demo data, config inspection, and one-shot forecasts.",
    after_help = "Examples:\n  salespulse migrate\n  salespulse seed --days 365\n  salespulse forecast --horizon-days 30"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load deterministic demo orders ending today (idempotent)")]
    Seed {
        #[arg(long, default_value_t = salespulse_db::DemoSalesDataset::DEFAULT_DAYS)]
        days: u32,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Compute the revenue and order forecast and print the payload")]
    Forecast {
        #[arg(long, help = "Override forecast.horizon_days for this run")]
        horizon_days: Option<u32>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed { days } => commands::seed::run(days),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Forecast { horizon_days } => commands::forecast::run(horizon_days),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
