use std::fs;

use scorecard::config::ConfigLoader;
use scorecard::report::{ReportFormat, ReportGenerator};
use scorecard::scoring::ScoreCalculator;
use tracing::info;

use crate::cli::ReportArgs;
use crate::infra::{load_catalog, AppError};

pub(crate) fn run(loader: &ConfigLoader, args: ReportArgs) -> Result<(), AppError> {
    let (catalog, levers) = load_catalog(loader)?;

    if catalog.categories().is_empty() {
        println!("No categories defined in metrics configuration.");
        println!(
            "Create a metrics.yaml file in your config directory or run 'scorecard init' to create default configuration files."
        );
        return Ok(());
    }

    let format: ReportFormat = args.format.parse().map_err(AppError::Report)?;
    let calculator = ScoreCalculator::new(&catalog, &levers, args.scoring_method.into());
    let generator = ReportGenerator::new(&calculator, args.labels.into());

    let content = match &args.category {
        Some(category) => generator.category_report(category, format)?,
        None => generator.overall_report(format)?,
    };

    match args.output {
        Some(path) => {
            fs::write(&path, &content).map_err(|source| AppError::Io { path: path.clone(), source })?;
            info!(path = %path.display(), "report written");
            println!("Report written to {}", path.display());
        }
        None => println!("{content}"),
    }

    Ok(())
}
