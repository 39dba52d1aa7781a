use colored::Colorize;

use crate::cli::text::{
    format_categories, format_kpis, format_monthly, format_transactions, format_validation_totals,
};
use crate::cli::{open_session, warn_no_data, FilterArgs};
use crate::error::{Result, SpendError};

pub fn run(file: &str, filter: &FilterArgs, rows: Option<usize>) -> Result<()> {
    let session = open_session(file, filter)?;
    println!("데이터 로드 완료: {}건", session.transactions.len());
    println!("{}", format_validation_totals(&session.validation).dimmed());

    let summary = match session.summary() {
        Ok(s) => s,
        Err(SpendError::NoMatchingData) => {
            warn_no_data();
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    println!("{}", format_kpis(&summary));
    println!();
    println!("{}", format_categories(&summary, None));
    println!();
    println!("{}", format_monthly(&summary.monthly));
    if let Some(n) = rows {
        println!();
        println!("{}", format_transactions(&session.selected(), n));
    }
    Ok(())
}
