use scorecard::config::{ConfigLoader, Thresholds};

use crate::cli::ValidateCommand;
use crate::infra::AppError;

/// Tolerance for summing user-supplied weights.
const WEIGHT_EPSILON: f64 = 0.0001;

pub(crate) fn run(loader: &ConfigLoader, command: ValidateCommand) -> Result<(), AppError> {
    match command {
        ValidateCommand::Weights => run_weights(loader),
        ValidateCommand::Thresholds => run_thresholds(loader),
    }
}

fn run_weights(loader: &ConfigLoader) -> Result<(), AppError> {
    let levers = loader.load_levers_config()?;
    let weights = &levers.weights.categories;

    println!("Category Weights Validation:");
    println!("--------------------------");

    if weights.is_empty() {
        return Err(AppError::ValidationFailed(
            "no category weights defined".to_string(),
        ));
    }

    let mut total = 0.0;
    for (category, weight) in weights {
        println!("{category}: {weight:.2} ({:.0}%)", weight * 100.0);
        total += weight;
    }
    println!();
    println!("Total weight: {total:.2} ({:.0}%)", total * 100.0);

    if (total - 1.0).abs() <= WEIGHT_EPSILON {
        println!("Validation PASSED: category weights add up to 100%");
        Ok(())
    } else {
        Err(AppError::ValidationFailed(format!(
            "category weights add up to {:.0}%, expected 100%",
            total * 100.0
        )))
    }
}

fn run_thresholds(loader: &ConfigLoader) -> Result<(), AppError> {
    let levers = loader.load_levers_config()?;
    let mut problems = Vec::new();

    println!("Threshold Validation:");
    println!("---------------------");

    check_thresholds("global", &levers.global.thresholds, &mut problems);
    check_thresholds("global KPI", &levers.global.kpi_thresholds, &mut problems);
    check_thresholds("global KRI", &levers.global.kri_thresholds, &mut problems);

    for (title, map) in [
        ("category", &levers.weights.category_thresholds),
        ("category KPI", &levers.weights.category_kpi_thresholds),
        ("category KRI", &levers.weights.category_kri_thresholds),
    ] {
        for (category, thresholds) in map {
            check_thresholds(&format!("{title} '{category}'"), thresholds, &mut problems);
        }
    }

    if problems.is_empty() {
        println!("Validation PASSED: all threshold ranges are valid and do not overlap");
        Ok(())
    } else {
        for problem in &problems {
            println!("  - {problem}");
        }
        println!();
        println!("Threshold ranges must satisfy:");
        println!("  1. min <= max within each range");
        println!("  2. no overlap (red.max < yellow.min, yellow.max < green.min)");
        println!("  3. full coverage of 0 to 100 (red.min = 0, green.max = 100)");
        Err(AppError::ValidationFailed(format!(
            "{} threshold problem(s) found",
            problems.len()
        )))
    }
}

/// Each set must be three ordered, non-overlapping ranges that together
/// cover 0..=100 (Red below Yellow below Green).
fn check_thresholds(scope: &str, thresholds: &Thresholds, problems: &mut Vec<String>) {
    let ranges = [
        ("green", &thresholds.green),
        ("yellow", &thresholds.yellow),
        ("red", &thresholds.red),
    ];
    for (name, range) in ranges {
        if range.min > range.max {
            problems.push(format!(
                "{scope}: {name} min ({}) must not exceed max ({})",
                range.min, range.max
            ));
        }
    }

    if thresholds.yellow.max >= thresholds.green.min {
        problems.push(format!(
            "{scope}: yellow max ({}) must be below green min ({})",
            thresholds.yellow.max, thresholds.green.min
        ));
    }
    if thresholds.red.max >= thresholds.yellow.min {
        problems.push(format!(
            "{scope}: red max ({}) must be below yellow min ({})",
            thresholds.red.max, thresholds.yellow.min
        ));
    }

    if thresholds.red.min > 0 {
        problems.push(format!(
            "{scope}: red min ({}) should be 0 to cover the whole scale",
            thresholds.red.min
        ));
    }
    if thresholds.green.max < 100 {
        problems.push(format!(
            "{scope}: green max ({}) should be 100 to cover the whole scale",
            thresholds.green.max
        ));
    }
}
