use crate::domain::model::CsvTable;
use crate::utils::error::{EtlError, Result};

/// Parses a UTF-8 CSV document with a header row.
///
/// Rows shorter than the header are padded with empty cells. Rows longer than
/// the header have no column to land in and are rejected.
pub fn parse_table(data: &[u8]) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(EtlError::ProcessingError {
                message: format!(
                    "line {} has {} fields but the header has {}",
                    line,
                    record.len(),
                    width
                ),
            });
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

pub fn write_table(table: &CsvTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !table.headers.is_empty() {
        writer.write_record(&table.headers)?;
    }
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}
