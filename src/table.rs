//! Tabular input for the matrix builders.
//!
//! The builders only need named, string-valued columns. Anything that can
//! answer those queries implements [`Table`]; [`DataTable`] is the
//! tab-delimited implementation used by the command line.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::{OncoError, OncoResult};

/// Read-only access to a rectangular table of string cells.
pub trait Table {
    /// Number of data rows (excluding the header).
    fn n_rows(&self) -> usize;

    /// Column names in header order.
    fn col_names(&self) -> &[String];

    /// Cell value; rows shorter than the header read as empty strings.
    fn value(&self, row: usize, col: usize) -> &str;

    fn n_cols(&self) -> usize {
        self.col_names().len()
    }

    /// Resolve a column by exact name match.
    fn find_col(&self, name: &str) -> OncoResult<usize> {
        self.col_names()
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| OncoError::ColumnNotFound(name.to_string()))
    }

    /// All values of one column, in row order.
    fn col_values(&self, col: usize) -> Vec<&str> {
        (0..self.n_rows()).map(|row| self.value(row, col)).collect()
    }
}

/// In-memory table of strings, typically loaded from a TSV file.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    /// Convenience constructor from string slices, mostly for tests.
    pub fn from_strs(name: &str, header: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load a tab-delimited file whose first non-comment line is the header.
    pub fn read(path: &str) -> OncoResult<Self> {
        let file = File::open(path).map_err(|e| {
            OncoError::Io(std::io::Error::other(format!(
                "Error opening table {}: {}",
                path, e
            )))
        })?;
        Self::from_reader(path, BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(name: &str, reader: R) -> OncoResult<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<String> = line.split('\t').map(|s| s.trim().to_string()).collect();

            match header {
                None => header = Some(fields),
                Some(ref h) => {
                    if fields.len() > h.len() {
                        return Err(OncoError::Parse(format!(
                            "Malformed line {} in {} (expected at most {} columns, got {})",
                            i + 1,
                            name,
                            h.len(),
                            fields.len()
                        )));
                    }
                    rows.push(fields);
                }
            }
        }

        let header =
            header.ok_or_else(|| OncoError::Parse(format!("Table {} has no header", name)))?;

        Ok(Self::new(name, header, rows))
    }
}

impl Table for DataTable {
    fn n_rows(&self) -> usize {
        self.rows.len()
    }

    fn col_names(&self) -> &[String] {
        &self.header
    }

    fn value(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(|s| s.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_tsv_parsing() {
        let data = "#version 2.4\nSample\tGene\tType\nS1\tTP53\tMissense\nS2\tKRAS\n\n";
        let table = DataTable::from_reader("muts", Cursor::new(data)).unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 3);
        assert_eq!(table.value(0, 1), "TP53");
        // short row reads as empty
        assert_eq!(table.value(1, 2), "");
        assert_eq!(table.col_values(0), vec!["S1", "S2"]);
    }

    #[test]
    fn test_find_col() {
        let table = DataTable::from_strs("t", &["Sample", "Gene"], &[]);
        assert_eq!(table.find_col("Gene").unwrap(), 1);

        let err = table.find_col("gene").unwrap_err();
        assert!(matches!(err, OncoError::ColumnNotFound(ref c) if c == "gene"));
    }

    #[test]
    fn test_tsv_too_many_fields() {
        let data = "A\tB\n1\t2\t3\n";
        let result = DataTable::from_reader("bad", Cursor::new(data));
        assert!(result.unwrap_err().to_string().contains("Malformed line 2"));
    }

    #[test]
    fn test_tsv_empty() {
        let result = DataTable::from_reader("empty", Cursor::new("# only comments\n"));
        assert!(result.is_err());
    }
}
