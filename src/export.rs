use crate::coerce::format_number;
use crate::data::{Table, Value};
use anyhow::{Context, Result};
use csv::Writer;
use std::io::Write;

/// Write the table as CSV: header line, then one record per row.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = Writer::from_writer(writer);
    out.write_record(&table.columns)
        .context("Failed to write CSV header")?;

    for (idx, row) in table.rows.iter().enumerate() {
        let record = table.columns.iter().map(|col| match row.get(col) {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Missing => String::new(),
        });
        out.write_record(record)
            .with_context(|| format!("Failed to write CSV record {}", idx + 1))?;
    }

    out.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Row;
    use std::io::Cursor;

    #[test]
    fn test_write_csv_quotes_and_missing() {
        let table = Table::new(
            vec!["name".into(), "note".into(), "v".into()],
            vec![
                Row::new().with("name", "A").with("note", "x, \"y\"").with("v", 3.0),
                Row::new().with("name", "B").with("v", 2.5),
            ],
        );
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "name,note,v\nA,\"x, \"\"y\"\"\",3\nB,,2.5\n");
    }

    #[test]
    fn test_write_csv_reads_back() {
        let table = Table::from_csv(Cursor::new("a,b\n1,hello\n,2\n")).unwrap();
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let again = Table::from_csv(Cursor::new(buf)).unwrap();
        assert_eq!(again.rows, table.rows);
    }
}
