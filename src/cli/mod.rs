pub mod budget;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod insight;
pub mod report;
pub mod sample;
pub mod summary;
pub mod text;
pub mod validate;

use std::path::Path;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::error::{Result, SpendError};
use crate::filter::{CategorySelection, Filter};
use crate::models::Category;
use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "spendlens",
    about = "Clean a personal expense sheet, summarize it, and draft a monthly report."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the schema, clean the file, print KPIs, and save the cleaned CSV.
    Validate {
        /// CSV or spreadsheet to validate
        file: String,
        /// Where to write the cleaned CSV
        #[arg(long, default_value = crate::export::PREPROCESSED_FILE_NAME)]
        output: String,
    },
    /// Show KPIs, the category breakdown, and monthly totals.
    Summary {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Also list the first N cleaned rows of the selection
        #[arg(long, value_name = "N")]
        rows: Option<usize>,
    },
    /// Suggest a budget per category (90% of current spend).
    Budget {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Ask the language model for a narrative analysis.
    Insight {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Write the markdown report.
    Report {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output path
        #[arg(long, default_value = crate::report::REPORT_FILE_NAME)]
        output: String,
        /// Skip the AI narrative section
        #[arg(long = "no-ai")]
        no_ai: bool,
    },
    /// Write the filtered, cleaned rows as CSV (UTF-8 with BOM).
    Export {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = crate::export::PREPROCESSED_FILE_NAME)]
        output: String,
    },
    /// Interactive terminal dashboard.
    Dashboard {
        /// CSV or spreadsheet to explore
        file: String,
    },
    /// Generate a synthetic expense file to try things out.
    Sample {
        #[arg(long, default_value = "300")]
        rows: usize,
        #[arg(long, default_value = "2024")]
        seed: u64,
        #[arg(long, default_value = crate::sample::SAMPLE_FILE_NAME)]
        output: String,
    },
    /// Show or change settings (API key, model, timeout).
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print current settings (the API key is masked).
    Show,
    /// Set one value: api_key, model, api_base, max_tokens, temperature, timeout_secs.
    Set { key: String, value: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<NaiveDate>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<NaiveDate>,
    /// Keep only these categories (repeatable), e.g. --category 식비
    #[arg(long = "category", conflicts_with = "no_category")]
    pub categories: Vec<String>,
    /// Select no categories at all
    #[arg(long = "no-category")]
    pub no_category: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<Filter> {
        let categories = if self.no_category {
            CategorySelection::Only(vec![])
        } else if self.categories.is_empty() {
            CategorySelection::All
        } else {
            let mut picked = Vec::new();
            for label in &self.categories {
                let cat = Category::from_label(label.trim()).ok_or_else(|| {
                    let known: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
                    SpendError::Other(format!(
                        "Unknown category '{label}' (expected one of: {})",
                        known.join(", ")
                    ))
                })?;
                if !picked.contains(&cat) {
                    picked.push(cat);
                }
            }
            CategorySelection::Only(picked)
        };
        Filter::new(self.from_date, self.to_date, categories)
    }
}

/// Load, clean, and apply the command-line filter.
pub(crate) fn open_session(file: &str, filter: &FilterArgs) -> Result<Session> {
    let filter = filter.to_filter()?;
    let mut session = Session::open(Path::new(file))?;
    session.set_filter(filter);
    Ok(session)
}

pub(crate) fn warn_no_data() {
    println!("{}", SpendError::NoMatchingData.to_string().yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_default_selects_all() {
        let f = FilterArgs::default().to_filter().unwrap();
        assert_eq!(f, Filter::default());
    }

    #[test]
    fn test_filter_args_categories() {
        let args = FilterArgs {
            categories: vec!["식비".into(), "카페".into(), "식비".into()],
            ..Default::default()
        };
        let f = args.to_filter().unwrap();
        assert_eq!(
            f.categories,
            CategorySelection::Only(vec![Category::Food, Category::Cafe])
        );
    }

    #[test]
    fn test_filter_args_unknown_category() {
        let args = FilterArgs {
            categories: vec!["간식".into()],
            ..Default::default()
        };
        let err = args.to_filter().unwrap_err();
        assert!(err.to_string().contains("Unknown category '간식'"), "got: {err}");
    }

    #[test]
    fn test_filter_args_no_category() {
        let args = FilterArgs { no_category: true, ..Default::default() };
        assert_eq!(args.to_filter().unwrap().categories, CategorySelection::Only(vec![]));
    }

    #[test]
    fn test_summary_rows_flag() {
        let cli = Cli::parse_from(["spendlens", "summary", "a.csv", "--rows", "20"]);
        assert!(matches!(cli.command, Commands::Summary { rows: Some(20), .. }));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        let cli = Cli::parse_from([
            "spendlens", "summary", "a.csv", "--from", "2024-01-01", "--to", "2024-01-31",
            "--category", "식비",
        ]);
        match cli.command {
            Commands::Summary { file, filter, rows } => {
                assert_eq!(file, "a.csv");
                assert_eq!(rows, None);
                assert_eq!(filter.from_date, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(filter.categories, vec!["식비"]);
            }
            _ => panic!("expected summary"),
        }
    }
}
