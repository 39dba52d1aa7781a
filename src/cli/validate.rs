use std::path::Path;

use colored::Colorize;

use crate::cli::text::{format_categories, format_kpis, format_monthly, format_validation};
use crate::error::Result;
use crate::export::save_preprocessed_csv;
use crate::loader::load_table;
use crate::preprocess::{preprocess, validate_schema};
use crate::summary::summarize;

/// Schema check, cleaning, KPI printout, and cleaned-CSV export in one pass.
pub fn run(file: &str, output: &str) -> Result<()> {
    let raw = load_table(Path::new(file))?;
    validate_schema(&raw)?;
    println!("{}", "Schema OK".green());

    let cleaned = preprocess(&raw)?;
    println!("{}", format_validation(&cleaned.report));
    println!();

    let summary = summarize(&cleaned.transactions);
    if summary.is_empty() {
        crate::cli::warn_no_data();
    } else {
        println!("{}", format_kpis(&summary));
        println!();
        println!("{}", format_categories(&summary, Some(5)));
        println!();
        println!("{}", format_monthly(&summary.monthly));
    }

    save_preprocessed_csv(Path::new(output), &cleaned.transactions)?;
    println!("\nPreprocessed file saved to: {output}");
    Ok(())
}
