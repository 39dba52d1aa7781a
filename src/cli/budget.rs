use crate::cli::text::format_budget;
use crate::cli::{open_session, warn_no_data, FilterArgs};
use crate::error::{Result, SpendError};

pub fn run(file: &str, filter: &FilterArgs) -> Result<()> {
    let session = open_session(file, filter)?;
    match session.budget() {
        Ok(rows) => println!("{}", format_budget(&rows)),
        Err(SpendError::NoMatchingData) => warn_no_data(),
        Err(e) => return Err(e),
    }
    Ok(())
}
