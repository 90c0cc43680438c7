use crate::error::DataError;
use crate::models::DepartmentRow;
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, warn};

pub const REQUIRED_COLUMNS: [&str; 4] = ["Department", "Students", "Faculty", "Budget"];

/// Shipped with the binary so the sample works from any directory.
pub const BUNDLED_SAMPLE: &str = include_str!("../sample_data.csv");

#[derive(Debug, Default)]
pub struct TableLoader;

struct ColumnIndex {
    department: usize,
    students: usize,
    faculty: usize,
    budget: usize,
}

impl TableLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Vec<DepartmentRow>, DataError> {
        let content = std::fs::read(file_path)?;
        debug!("read {} bytes from {}", content.len(), file_path.display());
        self.load_bytes(&content)
    }

    /// Load the sample file, or the bundled copy when it is not on disk.
    pub fn load_sample(&self, file_path: Option<&Path>) -> Result<Vec<DepartmentRow>, DataError> {
        match file_path {
            Some(path) if path.exists() => self.load_file(path),
            Some(path) => {
                warn!("sample file {} not found, using bundled sample", path.display());
                self.load_bytes(BUNDLED_SAMPLE.as_bytes())
            }
            None => self.load_bytes(BUNDLED_SAMPLE.as_bytes()),
        }
    }

    pub fn load_bytes(&self, content: &[u8]) -> Result<Vec<DepartmentRow>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(content);

        let columns = self.locate_columns(reader.headers()?)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // 1-based data row, header excluded
            rows.push(self.parse_row(&record, &columns, i + 1)?);
        }

        Ok(rows)
    }

    fn locate_columns(&self, headers: &StringRecord) -> Result<ColumnIndex, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            department: find(REQUIRED_COLUMNS[0])?,
            students: find(REQUIRED_COLUMNS[1])?,
            faculty: find(REQUIRED_COLUMNS[2])?,
            budget: find(REQUIRED_COLUMNS[3])?,
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        columns: &ColumnIndex,
        row: usize,
    ) -> Result<DepartmentRow, DataError> {
        let department = record
            .get(columns.department)
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(DepartmentRow {
            department,
            students: self.parse_number(record, columns.students, "Students", row)?,
            faculty: self.parse_number(record, columns.faculty, "Faculty", row)?,
            budget: self.parse_number(record, columns.budget, "Budget", row)?,
        })
    }

    fn parse_number(
        &self,
        record: &StringRecord,
        index: usize,
        column: &str,
        row: usize,
    ) -> Result<f64, DataError> {
        let raw = record.get(index).unwrap_or_default().trim();
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| DataError::InvalidNumber {
                row,
                column: column.to_string(),
                value: raw.to_string(),
            })
    }
}
