//! Column-major frame assembly and CSV buffer writing.

use std::fs::OpenOptions;
use std::path::Path;

use super::error::ExportError;

/// A column-major table: ordered named columns of equal length.
///
/// Columns are pushed independently during conversion; alignment is checked
/// once at row conversion. Missing values render as empty CSV cells.
#[derive(Debug, Default)]
pub struct Frame {
    columns: Vec<(String, Vec<Option<String>>)>,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named column. Length alignment is deferred to [`Frame::rows`].
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<String>>) {
        self.columns.push((name.into(), values));
    }

    /// Number of rows, taken from the first column.
    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    /// True when the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in output order.
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Row-align the columns.
    ///
    /// # Errors
    /// Returns [`ExportError::ColumnMismatch`] if any column's length
    /// differs from the first column's.
    pub fn rows(&self) -> Result<Vec<Vec<String>>, ExportError> {
        let expected = self.len();
        for (column, values) in &self.columns {
            if values.len() != expected {
                return Err(ExportError::ColumnMismatch {
                    column: column.clone(),
                    expected,
                    actual: values.len(),
                });
            }
        }

        let mut rows = Vec::with_capacity(expected);
        for i in 0..expected {
            rows.push(
                self.columns
                    .iter()
                    .map(|(_, values)| values[i].clone().unwrap_or_default())
                    .collect(),
            );
        }
        Ok(rows)
    }

    /// Write the frame to `path` with a header row, truncating any existing
    /// file.
    pub fn write_new(&self, path: &Path) -> Result<(), ExportError> {
        let rows = self.rows()?;
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.header())?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append the frame's rows (no header) to the existing buffer at `path`.
    pub fn append(&self, path: &Path) -> Result<(), ExportError> {
        let rows = self.rows()?;
        let file = OpenOptions::new().append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
