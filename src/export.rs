use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::Transaction;

pub const PREPROCESSED_FILE_NAME: &str = "expense_data_preprocessed.csv";

pub const EXPORT_COLUMNS: [&str; 7] = [
    "date",
    "amount",
    "category",
    "description",
    "payment_method",
    "is_fixed",
    "year_month",
];

/// Write cleaned rows as CSV, UTF-8 with a byte-order mark so spreadsheet
/// apps pick the right encoding for Korean text.
pub fn write_preprocessed_csv<W: Write>(mut out: W, transactions: &[Transaction]) -> Result<()> {
    out.write_all(b"\xEF\xBB\xBF")?;
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(EXPORT_COLUMNS)?;
    for t in transactions {
        wtr.write_record([
            t.date.format("%Y-%m-%d").to_string(),
            t.amount.to_string(),
            t.category.label().to_string(),
            t.description.clone(),
            t.payment_method.clone(),
            if t.is_fixed { "True" } else { "False" }.to_string(),
            t.year_month.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_preprocessed_csv(path: &Path, transactions: &[Transaction]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_preprocessed_csv(std::io::BufWriter::new(file), transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_table;
    use crate::models::Category;
    use crate::preprocess::preprocess;
    use chrono::NaiveDate;

    fn rows() -> Vec<Transaction> {
        vec![
            Transaction {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                amount: 10000.0,
                category: Category::Food,
                description: "점심, 김밥".into(),
                payment_method: "카드".into(),
                is_fixed: false,
                year_month: "2024-01".into(),
            },
            Transaction {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                amount: 55000.5,
                category: Category::Housing,
                description: "인터넷".into(),
                payment_method: "".into(),
                is_fixed: true,
                year_month: "2024-02".into(),
            },
        ]
    }

    #[test]
    fn test_output_starts_with_bom_and_header() {
        let mut buf = Vec::new();
        write_preprocessed_csv(&mut buf, &rows()).unwrap();
        assert!(buf.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,amount,category,description,payment_method,is_fixed,year_month")
        );
        assert_eq!(lines.next(), Some("2024-01-05,10000,식비,\"점심, 김밥\",카드,False,2024-01"));
    }

    #[test]
    fn test_saved_file_reloads_to_same_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREPROCESSED_FILE_NAME);
        save_preprocessed_csv(&path, &rows()).unwrap();
        let reloaded = preprocess(&load_table(&path).unwrap()).unwrap();
        assert_eq!(reloaded.transactions, rows());
    }
}
