use scorecard::config::{ConfigLoader, Thresholds};

use crate::cli::LeversCommand;
use crate::infra::AppError;

pub(crate) fn run(loader: &ConfigLoader, command: LeversCommand) -> Result<(), AppError> {
    match command {
        LeversCommand::Thresholds => run_thresholds(loader),
        LeversCommand::Weights => run_weights(loader),
        LeversCommand::Bands => run_bands(loader),
        LeversCommand::All => {
            run_thresholds(loader)?;
            println!();
            run_weights(loader)?;
            println!();
            run_bands(loader)
        }
    }
}

fn print_thresholds(indent: &str, thresholds: &Thresholds) {
    println!(
        "{indent}Green:  {}-{}",
        thresholds.green.min, thresholds.green.max
    );
    println!(
        "{indent}Yellow: {}-{}",
        thresholds.yellow.min, thresholds.yellow.max
    );
    println!("{indent}Red:    {}-{}", thresholds.red.min, thresholds.red.max);
}

fn run_thresholds(loader: &ConfigLoader) -> Result<(), AppError> {
    let levers = loader.load_levers_config()?;

    println!("Global Thresholds:");
    println!("-----------------");
    print_thresholds("", &levers.global.thresholds);
    println!();
    println!("Global KPI Thresholds:");
    print_thresholds("", &levers.global.kpi_thresholds);
    println!();
    println!("Global KRI Thresholds:");
    print_thresholds("", &levers.global.kri_thresholds);
    println!();

    println!("Category-Specific Thresholds:");
    println!("----------------------------");
    if levers.weights.category_thresholds.is_empty() {
        println!("No category-specific thresholds defined.");
    } else {
        for (category, thresholds) in &levers.weights.category_thresholds {
            println!("{category}:");
            print_thresholds("  ", thresholds);
        }
    }

    for (title, map) in [
        ("Category KPI Thresholds:", &levers.weights.category_kpi_thresholds),
        ("Category KRI Thresholds:", &levers.weights.category_kri_thresholds),
    ] {
        if !map.is_empty() {
            println!();
            println!("{title}");
            for (category, thresholds) in map {
                println!("{category}:");
                print_thresholds("  ", thresholds);
            }
        }
    }

    Ok(())
}

fn run_weights(loader: &ConfigLoader) -> Result<(), AppError> {
    let levers = loader.load_levers_config()?;

    println!("Category Weights:");
    println!("----------------");
    if levers.weights.categories.is_empty() {
        println!("No category weights defined.");
    } else {
        for (category, weight) in &levers.weights.categories {
            println!("{category}: {weight:.2}");
        }
    }
    Ok(())
}

fn run_bands(loader: &ConfigLoader) -> Result<(), AppError> {
    let config = loader.load_metrics_config()?;

    println!("Scoring Bands:");
    println!("--------------");
    for category in &config.categories {
        for kpi in &category.kpis {
            println!("{}.KPI.{}:", category.id, kpi.id);
            for band in &kpi.scoring_bands {
                println!("  {} => {}", band_range(band.min, band.max), band.score);
            }
        }
        for kri in &category.kris {
            println!("{}.KRI.{}:", category.id, kri.id);
            for band in &kri.scoring_bands {
                println!("  {} => {}", band_range(band.min, band.max), band.score);
            }
        }
    }
    Ok(())
}

fn band_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min}..{max}"),
        (Some(min), None) => format!("{min}.."),
        (None, Some(max)) => format!("..{max}"),
        (None, None) => "any".to_string(),
    }
}
