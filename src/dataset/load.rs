//! CSV dataset loading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use resampler_common::ToolError;

use super::{Dataset, Record};

/// Cell tokens read as a missing value.
const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "null"];

impl Dataset {
    /// Load a dataset from a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> resampler_common::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ToolError::DatasetNotFound { path: path.to_path_buf() });
        }
        let file = File::open(path)
            .map_err(|e| ToolError::io(format!("opening {}", path.display()), e))?;
        Self::from_csv_reader(file)
    }

    /// Load a dataset from any CSV source with a header row.
    ///
    /// Every column is numeric; empty cells and `NA`/`NaN`/`null` become
    /// missing values.
    pub fn from_csv_reader<R: Read>(reader: R) -> resampler_common::Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .has_headers(true)
            .from_reader(reader);

        let fields: Vec<String> = rdr
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();
        if fields.is_empty() || fields.iter().any(String::is_empty) {
            return Err(ToolError::DatasetParsing {
                line: 1,
                message: "header row has an empty column name".to_string(),
            });
        }

        let mut dataset = Dataset::new(fields);
        for row in rdr.records() {
            let row = row.map_err(csv_error)?;
            let record = parse_record(&row, dataset.fields())?;
            dataset.records.push(record);
        }
        Ok(dataset)
    }
}

fn parse_record(row: &StringRecord, fields: &[String]) -> resampler_common::Result<Record> {
    let line = row.position().map_or(0, csv::Position::line);
    let values = row
        .iter()
        .zip(fields)
        .map(|(cell, field)| {
            if MISSING_TOKENS.contains(&cell) {
                return Ok(None);
            }
            cell.parse::<f64>().map(Some).map_err(|_| ToolError::DatasetParsing {
                line,
                message: format!("column '{field}' holds non-numeric value {cell:?}"),
            })
        })
        .collect::<resampler_common::Result<Vec<_>>>()?;
    Ok(Record::new(values))
}

fn csv_error(err: csv::Error) -> ToolError {
    let line = err.position().map_or(0, csv::Position::line);
    ToolError::DatasetParsing { line, message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const AIR: &str = "pm25, cmaq, aod, poverty\n\
                       9.6, 8.1, 35.0, 0.12\n\
                       11.2, NA, 41.5, 0.20\n\
                       7.4, 6.0, , 0.08\n";

    #[test]
    fn test_reads_header_and_missing_cells() {
        let d = Dataset::from_csv_reader(AIR.as_bytes()).unwrap();
        assert_eq!(d.fields(), &["pm25", "cmaq", "aod", "poverty"]);
        assert_eq!(d.len(), 3);
        assert_eq!(d.records()[0].get(1), Some(8.1));
        assert_eq!(d.records()[1].get(1), None);
        assert_eq!(d.records()[2].get(2), None);
    }

    #[test]
    fn test_non_numeric_cell_names_line_and_column() {
        let data = "pm25,aod\n1.0,2.0\n3.0,high\n";
        let err = Dataset::from_csv_reader(data.as_bytes()).unwrap_err();
        match err {
            ToolError::DatasetParsing { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("aod"));
                assert!(message.contains("high"));
            }
            other => panic!("expected DatasetParsing, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let data = "pm25,aod\n1.0,2.0\n3.0\n";
        let err = Dataset::from_csv_reader(data.as_bytes()).unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(AIR.as_bytes()).unwrap();
        let d = Dataset::from_csv_path(file.path()).unwrap();
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_csv_path("/nonexistent/air.csv").unwrap_err();
        assert!(matches!(err, ToolError::DatasetNotFound { .. }));
    }
}
