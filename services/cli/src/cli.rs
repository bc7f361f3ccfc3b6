use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scorecard::config::ConfigLoader;
use scorecard::report::LabelStyle;
use scorecard::scoring::ScoringMethod;

use crate::infra::{default_dirs, AppError};
use crate::{levers, metrics, report, telemetry, validate};

#[derive(Parser, Debug)]
#[command(
    name = "scorecard",
    about = "Report on Key Performance Indicators (KPIs) and Key Risk Indicators (KRIs) for security programs",
    version
)]
struct Cli {
    /// Directory containing configuration files
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Directory containing metric data files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log level or filter directive when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create default configuration and data files
    Init {
        /// Target directory (defaults to the configured locations)
        directory: Option<PathBuf>,
    },
    /// Generate a security posture report
    Report(ReportArgs),
    /// Manage metric observations and data files
    Metrics {
        #[command(subcommand)]
        command: MetricsCommand,
    },
    /// List all categories with their KPI and KRI definitions
    Categories,
    /// View configuration levers that affect scoring
    Levers {
        #[command(subcommand)]
        command: LeversCommand,
    },
    /// Validate lever configurations
    Validate {
        #[command(subcommand)]
        command: ValidateCommand,
    },
    /// Print the version number
    Version,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Report on a single category instead of the whole program
    #[arg(long, short = 'c')]
    pub(crate) category: Option<String>,
    /// Report format (text, json, or table)
    #[arg(long, short = 'f', default_value = "text")]
    pub(crate) format: String,
    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub(crate) output: Option<PathBuf>,
    /// How metric scores combine into category and overall scores
    #[arg(long, value_enum, default_value = "median")]
    pub(crate) scoring_method: MethodArg,
    /// Status label style in text and table output
    #[arg(long, value_enum, default_value = "emoji")]
    pub(crate) labels: LabelArg,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum MethodArg {
    Median,
    Average,
}

impl From<MethodArg> for ScoringMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Median => ScoringMethod::Median,
            MethodArg::Average => ScoringMethod::Average,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum LabelArg {
    Emoji,
    Text,
}

impl From<LabelArg> for LabelStyle {
    fn from(arg: LabelArg) -> Self {
        match arg {
            LabelArg::Emoji => LabelStyle::Emoji,
            LabelArg::Text => LabelStyle::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum MetricsCommand {
    /// Record a new value for a metric
    Update {
        /// Metric reference (e.g. app_sec.KPI.vuln_remediation_time)
        #[arg(long, short = 'm')]
        metric: String,
        /// New metric value
        #[arg(long, short = 'v')]
        value: f64,
    },
    /// List all recorded metrics with their current values
    List,
    /// List all metric data files
    ListFiles,
    /// Create a new empty metric data file
    CreateFile {
        /// File name (a .yaml suffix is appended if absent)
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum LeversCommand {
    /// Show global and category-specific thresholds
    Thresholds,
    /// Show category weights
    Weights,
    /// Show per-metric scoring bands
    Bands,
    /// Show all levers
    All,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ValidateCommand {
    /// Check that category weights sum to 100%
    Weights,
    /// Check that threshold ranges are ordered, non-overlapping, and cover 0-100
    Thresholds,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    telemetry::init(&cli.log_level)?;

    let (default_config_dir, default_data_dir) = default_dirs()?;
    let config_dir = cli.config_dir.unwrap_or(default_config_dir);
    let data_dir = cli.data_dir.unwrap_or(default_data_dir);
    let loader = ConfigLoader::new(config_dir, data_dir);

    match cli.command {
        Command::Init { directory } => run_init(&loader, directory),
        Command::Report(args) => report::run(&loader, args),
        Command::Metrics { command } => metrics::run(&loader, command),
        Command::Categories => metrics::run_categories(&loader),
        Command::Levers { command } => levers::run(&loader, command),
        Command::Validate { command } => validate::run(&loader, command),
        Command::Version => {
            println!("{}", version_line());
            Ok(())
        }
    }
}

fn version_line() -> String {
    format!("scorecard version {}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_subcommand_parses() {
        let cli = Cli::try_parse_from(["scorecard", "version"]).expect("parses");
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn version_line_carries_the_package_version() {
        assert!(version_line().ends_with(env!("CARGO_PKG_VERSION")));
    }
}

fn run_init(loader: &ConfigLoader, directory: Option<PathBuf>) -> Result<(), AppError> {
    let loader = match directory {
        Some(base) => ConfigLoader::new(base.join("config"), base.join("data")),
        None => ConfigLoader::new(loader.config_dir(), loader.data_dir()),
    };

    loader.create_default_files()?;

    println!("Default configuration files created in:");
    println!("  Config directory: {}", loader.config_dir().display());
    println!("  Data directory: {}", loader.data_dir().display());
    Ok(())
}
