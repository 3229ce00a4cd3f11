use chrono::Utc;
use salespulse_core::config::LoadOptions;
use salespulse_db::{DemoSalesDataset, SeedResult};

use crate::commands::{open_migrated_pool, prepare, CommandResult, StepFailure};

pub fn run(days: u32) -> CommandResult {
    run_with(LoadOptions::default(), days)
}

pub fn run_with(options: LoadOptions, days: u32) -> CommandResult {
    if days == 0 {
        return CommandResult::failure("seed", "invalid_argument", "--days must be at least 1", 2);
    }

    let (config, runtime) = match prepare(options) {
        Ok(prepared) => prepared,
        Err(failure) => return failure.into_result("seed"),
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;
        let today = Utc::now().date_naive();

        let seeded = DemoSalesDataset::load(&pool, today, days)
            .await
            .map_err(|error| StepFailure::new("seed_execution", error, 5))?;

        let verification = DemoSalesDataset::verify(&pool)
            .await
            .map_err(|error| StepFailure::new("seed_verification", error, 6))?;

        pool.close().await;

        if verification.all_present {
            Ok::<SeedResult, StepFailure>(seeded)
        } else {
            let message = failed_checks_message(&verification.checks);
            Err(StepFailure::new("seed_verification", message, 6))
        }
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary_message(&seeded)),
        Err(failure) => failure.into_result("seed"),
    }
}

fn summary_message(seeded: &SeedResult) -> String {
    let window = match (seeded.first_day, seeded.last_day) {
        (Some(first), Some(last)) => format!("{first}..={last}"),
        _ => "no days".to_string(),
    };
    format!(
        "demo sales loaded: {} orders ({} canceled/closed) over {window}; \
         {} customers, {} products; qualifying revenue {}",
        seeded.orders,
        seeded.excluded_orders,
        seeded.customers,
        seeded.products,
        seeded.qualifying_revenue.round_dp(2),
    )
}

fn failed_checks_message(checks: &[(&'static str, bool)]) -> String {
    let failed = checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();
    if failed.is_empty() {
        "some demo data failed to load".to_string()
    } else {
        format!("seed verification failed for checks: {}", failed.join(", "))
    }
}
