mod cli;
mod infra;
mod levers;
mod metrics;
mod report;
mod telemetry;
mod validate;

use infra::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
