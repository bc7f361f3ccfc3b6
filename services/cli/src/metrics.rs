use std::fs;

use scorecard::config::ConfigLoader;
use tracing::info;

use crate::cli::MetricsCommand;
use crate::infra::{load_catalog, AppError};

pub(crate) fn run(loader: &ConfigLoader, command: MetricsCommand) -> Result<(), AppError> {
    match command {
        MetricsCommand::Update { metric, value } => run_update(loader, &metric, value),
        MetricsCommand::List => run_list(loader),
        MetricsCommand::ListFiles => run_list_files(loader),
        MetricsCommand::CreateFile { name } => run_create_file(loader, &name),
    }
}

fn run_update(loader: &ConfigLoader, reference: &str, value: f64) -> Result<(), AppError> {
    let (mut catalog, _levers) = load_catalog(loader)?;

    catalog.update_metric(reference, value)?;
    loader.save_metrics_data(catalog.data())?;

    info!(reference, value, "metric updated");
    println!("Metric {reference} updated to {value}");
    Ok(())
}

fn run_list(loader: &ConfigLoader) -> Result<(), AppError> {
    let (catalog, _levers) = load_catalog(loader)?;

    println!("Available Metrics:");
    println!("------------------");
    for metric in catalog.all_metrics() {
        println!(
            "{}: {:.2} (as of {})",
            metric.reference,
            metric.value,
            metric.timestamp.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn run_list_files(loader: &ConfigLoader) -> Result<(), AppError> {
    let data_dir = loader.data_dir();
    if !data_dir.exists() {
        println!("Data directory does not exist.");
        return Ok(());
    }

    let entries = fs::read_dir(data_dir).map_err(|source| AppError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    names.sort();

    if names.is_empty() {
        println!("No metric files found.");
        return Ok(());
    }

    println!("Available metric files:");
    println!("----------------------");
    for name in names {
        if name == "metrics.yaml" {
            println!("{name} (legacy format)");
        } else {
            println!("{name}");
        }
    }
    Ok(())
}

fn run_create_file(loader: &ConfigLoader, name: &str) -> Result<(), AppError> {
    let file_name = loader.create_metric_file(name)?;
    println!("Metric file '{file_name}' created successfully.");
    Ok(())
}

pub(crate) fn run_categories(loader: &ConfigLoader) -> Result<(), AppError> {
    let config = loader.load_metrics_config()?;

    println!("Available Categories:");
    println!("--------------------");
    for category in &config.categories {
        println!("{} ({}): {}", category.name, category.id, category.description);

        println!("  KPIs:");
        for kpi in &category.kpis {
            println!(
                "  - {} ({}): {} [Target: {:.2} {}]",
                kpi.name, kpi.id, kpi.description, kpi.target, kpi.unit
            );
        }

        println!("  KRIs:");
        for kri in &category.kris {
            println!(
                "  - {} ({}): {} [Threshold: {:.2} {}]",
                kri.name, kri.id, kri.description, kri.threshold, kri.unit
            );
        }

        println!();
    }
    Ok(())
}
