use std::path::Path;

use crate::cli::{open_session, warn_no_data, FilterArgs};
use crate::error::Result;
use crate::export::save_preprocessed_csv;

pub fn run(file: &str, filter: &FilterArgs, output: &str) -> Result<()> {
    let session = open_session(file, filter)?;
    let rows = session.selected();
    if rows.is_empty() {
        warn_no_data();
        return Ok(());
    }
    save_preprocessed_csv(Path::new(output), &rows)?;
    println!("Wrote {} rows to {output}", rows.len());
    Ok(())
}
