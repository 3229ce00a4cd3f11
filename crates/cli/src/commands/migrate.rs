use salespulse_core::config::LoadOptions;
use salespulse_db::migrations;

use crate::commands::{open_migrated_pool, prepare, CommandResult, StepFailure};

pub fn run() -> CommandResult {
    run_with(LoadOptions::default())
}

pub fn run_with(options: LoadOptions) -> CommandResult {
    let (config, runtime) = match prepare(options) {
        Ok(prepared) => prepared,
        Err(failure) => return failure.into_result("migrate"),
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;
        pool.close().await;
        Ok::<(), StepFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success(
            "migrate",
            format!("applied pending migrations ({} embedded)", migrations::embedded_count()),
        ),
        Err(failure) => failure.into_result("migrate"),
    }
}
