//! In-memory tables loaded from delimited text.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Value;

/// Errors that can occur while building or loading a table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to open {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    #[error("Malformed delimited input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} has {actual} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Ordered rows of values sharing one set of named columns.
///
/// Every row holds exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Appends a row; its length must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowLength {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn with_row(mut self, row: Vec<Value>) -> Result<Self, TableError> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Loads a table from a delimited UTF-8 file with a header row.
    pub fn from_csv_path(path: &Path, delimiter: u8) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|e| TableError::Io(path.to_path_buf(), e))?;
        Self::from_csv_reader(file, delimiter)
    }

    /// Loads a table from any reader of delimited UTF-8 text with a header row.
    ///
    /// Cell types are inferred with [`Value::infer`].
    pub fn from_csv_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let mut table = Self::new(columns)?;

        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(Value::infer).collect())?;
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
お遍路の番号,名前,住所,緯度(北緯),経度(東経),徒歩距離(m)
1,霊山寺,徳島県鳴門市大麻町板東塚鼻126,34.159,134.503,0
2,極楽寺,徳島県鳴門市大麻町檜字段の上12,34.155,134.491,1400
";

    #[test]
    fn test_load_from_reader() {
        let table = Table::from_csv_reader(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(table.columns().len(), 6);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("名前"), Some(1));

        let first: Vec<&[Value]> = table.rows().collect();
        assert_eq!(first[0][0], Value::Integer(1));
        assert_eq!(first[0][1], Value::from("霊山寺"));
        assert_eq!(first[0][3], Value::Float(34.159));
        assert_eq!(first[1][5], Value::Integer(1400));
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("temples.tsv");
        let mut file = File::create(&path).unwrap();
        write!(file, "id\tname\n1\ta\n").unwrap();

        let table = Table::from_csv_path(&path, b'\t').unwrap();
        assert_eq!(table.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing.csv");
        let err = Table::from_csv_path(&path, b',').unwrap_err();
        assert!(matches!(err, TableError::Io(_, _)));
    }

    #[test]
    fn test_bom_and_padding_stripped_from_headers() {
        let input = "\u{feff} id , name\n1,a\n";
        let table = Table::from_csv_reader(input.as_bytes(), b',').unwrap();
        assert_eq!(table.column_index("id"), Some(0));
        assert_eq!(table.column_index("name"), Some(1));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let input = "id,name\n1,a\n2\n";
        let err = Table::from_csv_reader(input.as_bytes(), b',').unwrap_err();
        match err {
            TableError::RowLength {
                row,
                expected,
                actual,
            } => {
                assert_eq!(row, 2);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::new(vec!["id".into(), "id".into()]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(c) if c == "id"));
    }

    #[test]
    fn test_header_only_is_empty() {
        let table = Table::from_csv_reader("id,name\n".as_bytes(), b',').unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }
}
