use std::path::Path;

use crate::error::Result;
use crate::sample::write_sample_csv;

pub fn run(rows: usize, seed: u64, output: &str) -> Result<()> {
    let path = Path::new(output);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_sample_csv(std::io::BufWriter::new(file), rows, seed)?;
    println!("Wrote {rows} sample rows to {output}");
    Ok(())
}
