// CSV export of the full ledger
//
// Header row is plain; every data field is quoted with embedded quotes
// doubled, so descriptions containing commas or quotes import cleanly.
// Lines are joined with '\n' and the file has no trailing terminator.

use crate::error::{Result, TrackerError};
use crate::models::Transaction;
use std::io::Write;

pub const EXPORT_HEADER: [&str; 5] = ["Date", "Description", "Amount", "Category", "Type"];

/// Default file name used by the CLI.
pub const EXPORT_FILE_NAME: &str = "expense-data.csv";

/// One export row: local date (M/D/YYYY), description, amount, category, type.
pub fn export_row(tx: &Transaction) -> [String; 5] {
    [
        tx.local_date().format("%-m/%-d/%Y").to_string(),
        tx.description.clone(),
        tx.amount.to_string(),
        tx.category.clone(),
        tx.kind.as_str().to_string(),
    ]
}

/// Write the ledger as CSV, in ledger order.
pub fn write_csv<W: Write>(transactions: &[Transaction], mut writer: W) -> Result<()> {
    if transactions.is_empty() {
        return Err(TrackerError::NothingToExport);
    }

    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for tx in transactions {
        csv.write_record(&export_row(tx))?;
    }

    let mut rows = csv.into_inner().map_err(|e| e.into_error())?;
    // Drop the terminator after the last record
    if rows.last() == Some(&b'\n') {
        rows.pop();
    }

    writer.write_all(EXPORT_HEADER.join(",").as_bytes())?;
    writer.write_all(b"\n")?;
    writer.write_all(&rows)?;
    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(transactions: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(transactions, &mut buf)?;
    // Every field is a Rust String, so the output is valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::{Local, TimeZone, Utc};

    fn tx(description: &str, amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            id: 1,
            description: description.to_string(),
            amount,
            category: "Food".to_string(),
            kind,
            date: Local
                .with_ymd_and_hms(2026, 3, 7, 13, 0, 0)
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_header_and_quoted_rows() {
        let ledger = vec![
            tx("Lunch", 300.0, TransactionType::Expense),
            tx("Bonus", 12.5, TransactionType::Income),
        ];

        let csv = to_csv_string(&ledger).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Description,Amount,Category,Type");
        assert_eq!(lines[1], r#""3/7/2026","Lunch","300","Food","expense""#);
        assert_eq!(lines[2], r#""3/7/2026","Bonus","12.5","Food","income""#);
        assert_eq!(lines.len(), 3);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_escapes_quotes_and_delimiters() {
        let ledger = vec![tx(r#"Pizza, "large""#, 18.0, TransactionType::Expense)];

        let csv = to_csv_string(&ledger).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert_eq!(row, r#""3/7/2026","Pizza, ""large""","18","Food","expense""#);

        // Reads back to the original value
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let record = rdr.records().next().unwrap().unwrap();
        assert_eq!(&record[1], r#"Pizza, "large""#);
    }

    #[test]
    fn test_empty_ledger_is_rejected() {
        let err = to_csv_string(&[]).unwrap_err();
        assert!(matches!(err, TrackerError::NothingToExport));
    }
}
