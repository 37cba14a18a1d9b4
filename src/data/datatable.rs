use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::data::table_model::TableModel;

/// Represents the data type of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Null,
    Mixed, // For columns with mixed types
}

impl DataType {
    /// Infer type from a string value
    pub fn infer_from_string(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return DataType::Null;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return DataType::Boolean;
        }

        if value.parse::<i64>().is_ok() {
            return DataType::Integer;
        }

        if value.parse::<f64>().is_ok() {
            return DataType::Float;
        }

        if looks_like_datetime(value) {
            return DataType::DateTime;
        }

        DataType::String
    }

    /// Merge two types (for columns with mixed types)
    pub fn merge(&self, other: &DataType) -> DataType {
        if self == other {
            return self.clone();
        }

        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => t.clone(),
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
                DataType::Float
            }
            _ => DataType::Mixed,
        }
    }
}

/// Check whether a string parses as a calendar date or timestamp
fn looks_like_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Column metadata and definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub unique_values: Option<usize>,
    pub null_count: usize,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::String,
            nullable: true,
            unique_values: None,
            null_count: 0,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

/// A single cell value in the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 string
    Null,
}

impl DataValue {
    pub fn from_string(s: &str, data_type: &DataType) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return DataValue::Null;
        }

        match data_type {
            DataType::String => DataValue::String(s.to_string()),
            DataType::Integer => s
                .parse::<i64>()
                .map(DataValue::Integer)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Float => s
                .parse::<f64>()
                .map(DataValue::Float)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Boolean => {
                let lower = s.to_lowercase();
                DataValue::Boolean(lower == "true" || lower == "1" || lower == "yes")
            }
            DataType::DateTime => DataValue::DateTime(s.to_string()),
            DataType::Null => DataValue::Null,
            DataType::Mixed => {
                let inferred = DataType::infer_from_string(s);
                Self::from_string(s, &inferred)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::String(_) => DataType::String,
            DataValue::Integer(_) => DataType::Integer,
            DataValue::Float(_) => DataType::Float,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::DateTime(_) => DataType::DateTime,
            DataValue::Null => DataType::Null,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Null => write!(f, ""),
        }
    }
}

/// A row of data in the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRow {
    pub values: Vec<DataValue>,
}

impl DataRow {
    pub fn new(values: Vec<DataValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The main DataTable structure
///
/// Mutations do not notify anyone; the owner is responsible for forwarding
/// row insertions/deletions/updates to any `ViewIndex` built over the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<DataRow>,
    pub metadata: HashMap<String, String>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn add_column(&mut self, column: DataColumn) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "Row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Insert a single row at the given position (shifting later rows down)
    pub fn insert_row(&mut self, at: usize, row: DataRow) -> Result<()> {
        self.insert_rows(at, vec![row])
    }

    /// Insert a batch of rows starting at the given position
    pub fn insert_rows(&mut self, at: usize, rows: Vec<DataRow>) -> Result<()> {
        if at > self.rows.len() {
            bail!(
                "Insert position {} out of bounds for table with {} rows",
                at,
                self.rows.len()
            );
        }
        for row in &rows {
            if row.len() != self.columns.len() {
                bail!(
                    "Row has {} values but table has {} columns",
                    row.len(),
                    self.columns.len()
                );
            }
        }
        self.rows.splice(at..at, rows);
        Ok(())
    }

    /// Remove the rows in `[first, last]` (inclusive)
    pub fn remove_rows(&mut self, first: usize, last: usize) -> Result<()> {
        if first > last || last >= self.rows.len() {
            bail!(
                "Invalid row range [{}, {}] for table with {} rows",
                first,
                last,
                self.rows.len()
            );
        }
        self.rows.drain(first..=last);
        Ok(())
    }

    /// Overwrite a single cell
    pub fn set_value(&mut self, row: usize, col: usize, value: DataValue) -> Result<()> {
        if row >= self.rows.len() {
            bail!("Row {} out of bounds for table with {} rows", row, self.rows.len());
        }
        if col >= self.columns.len() {
            bail!(
                "Column {} out of bounds for table with {} columns",
                col,
                self.columns.len()
            );
        }
        self.rows[row].values[col] = value;
        Ok(())
    }

    pub fn get_column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names as a vector
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Infer and update column types based on data
    pub fn infer_column_types(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            let mut inferred_type = DataType::Null;
            let mut null_count = 0;
            let mut unique_values = std::collections::HashSet::new();

            for row in &self.rows {
                if let Some(value) = row.get(col_idx) {
                    if value.is_null() {
                        null_count += 1;
                    } else {
                        let value_type = value.data_type();
                        inferred_type = inferred_type.merge(&value_type);
                        unique_values.insert(value.to_string());
                    }
                }
            }

            column.data_type = inferred_type;
            column.null_count = null_count;
            column.nullable = null_count > 0;
            column.unique_values = Some(unique_values.len());
        }
    }

    /// Get a value at specific row and column
    pub fn get_value(&self, row: usize, col: usize) -> Option<&DataValue> {
        self.rows.get(row)?.get(col)
    }

    /// Get a value by row index and column name
    pub fn get_value_by_name(&self, row: usize, col_name: &str) -> Option<&DataValue> {
        let col_idx = self.get_column_index(col_name)?;
        self.get_value(row, col_idx)
    }

    /// Generate a debug dump string for display
    pub fn debug_dump(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("DataTable: {}\n", self.name));
        output.push_str(&format!(
            "Rows: {} | Columns: {}\n",
            self.row_count(),
            self.column_count()
        ));

        output.push_str("\nColumns:\n");
        for column in &self.columns {
            output.push_str(&format!("  {} ({:?})", column.name, column.data_type));
            if column.nullable {
                output.push_str(&format!(" - nullable, {} nulls", column.null_count));
            }
            if let Some(unique) = column.unique_values {
                output.push_str(&format!(", {} unique", unique));
            }
            output.push('\n');
        }

        if self.row_count() > 0 {
            let sample_size = 5.min(self.row_count());
            output.push_str(&format!("\nFirst {} rows:\n", sample_size));

            for row_idx in 0..sample_size {
                output.push_str(&format!("  [{}]: ", row_idx));
                for (col_idx, value) in self.rows[row_idx].values.iter().enumerate() {
                    if col_idx > 0 {
                        output.push_str(", ");
                    }
                    output.push_str(&value.to_string());
                }
                output.push('\n');
            }
        }

        output
    }
}

impl TableModel for DataTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn value_at(&self, row: usize, column: usize) -> DataValue {
        self.get_value(row, column).cloned().unwrap_or(DataValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_inference() {
        assert_eq!(DataType::infer_from_string("123"), DataType::Integer);
        assert_eq!(DataType::infer_from_string("123.45"), DataType::Float);
        assert_eq!(DataType::infer_from_string("true"), DataType::Boolean);
        assert_eq!(DataType::infer_from_string("hello"), DataType::String);
        assert_eq!(DataType::infer_from_string(""), DataType::Null);
        assert_eq!(
            DataType::infer_from_string("2024-01-01"),
            DataType::DateTime
        );
        assert_eq!(
            DataType::infer_from_string("2024-01-01T12:30:00"),
            DataType::DateTime
        );
        // Dash-separated text must not be mistaken for a date
        assert_eq!(DataType::infer_from_string("foo-bar-baz"), DataType::String);
    }

    #[test]
    fn test_datatable_creation() {
        let mut table = DataTable::new("test");

        table.add_column(DataColumn::new("id").with_type(DataType::Integer));
        table.add_column(DataColumn::new("name").with_type(DataType::String));
        table.add_column(DataColumn::new("active").with_type(DataType::Boolean));

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 0);

        let row = DataRow::new(vec![
            DataValue::Integer(1),
            DataValue::String("Alice".to_string()),
            DataValue::Boolean(true),
        ]);

        table.add_row(row).unwrap();
        assert_eq!(table.row_count(), 1);

        let value = table.get_value_by_name(0, "name").unwrap();
        assert_eq!(value.to_string(), "Alice");
    }

    #[test]
    fn test_add_row_arity_mismatch() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("a"));
        table.add_column(DataColumn::new("b"));

        let result = table.add_row(DataRow::new(vec![DataValue::Integer(1)]));
        assert!(result.is_err());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_insert_and_remove_rows() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("v"));
        for i in 0..3 {
            table
                .add_row(DataRow::new(vec![DataValue::Integer(i)]))
                .unwrap();
        }

        table
            .insert_row(1, DataRow::new(vec![DataValue::Integer(10)]))
            .unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.get_value(1, 0), Some(&DataValue::Integer(10)));
        assert_eq!(table.get_value(2, 0), Some(&DataValue::Integer(1)));

        table.remove_rows(1, 2).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_value(0, 0), Some(&DataValue::Integer(0)));
        assert_eq!(table.get_value(1, 0), Some(&DataValue::Integer(2)));

        assert!(table.remove_rows(1, 0).is_err());
        assert!(table.remove_rows(0, 5).is_err());
    }

    #[test]
    fn test_set_value_bounds() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("v"));
        table
            .add_row(DataRow::new(vec![DataValue::Integer(1)]))
            .unwrap();

        table.set_value(0, 0, DataValue::Integer(2)).unwrap();
        assert_eq!(table.get_value(0, 0), Some(&DataValue::Integer(2)));

        assert!(table.set_value(1, 0, DataValue::Null).is_err());
        assert!(table.set_value(0, 1, DataValue::Null).is_err());
    }

    #[test]
    fn test_type_inference() {
        let mut table = DataTable::new("test");

        table.add_column(DataColumn::new("mixed"));

        table
            .add_row(DataRow::new(vec![DataValue::Integer(1)]))
            .unwrap();
        table
            .add_row(DataRow::new(vec![DataValue::Float(2.5)]))
            .unwrap();
        table.add_row(DataRow::new(vec![DataValue::Null])).unwrap();

        table.infer_column_types();

        // Should infer Float since we have both Integer and Float
        assert_eq!(table.columns[0].data_type, DataType::Float);
        assert_eq!(table.columns[0].null_count, 1);
        assert!(table.columns[0].nullable);
    }

    #[test]
    fn test_table_model_accessors() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("name"));
        table
            .add_row(DataRow::new(vec![DataValue::String("x".to_string())]))
            .unwrap();
        table.add_row(DataRow::new(vec![DataValue::Null])).unwrap();

        let model: &dyn TableModel = &table;
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.column_count(), 1);
        assert_eq!(model.value_at(0, 0), DataValue::String("x".to_string()));
        assert_eq!(model.value_at(5, 0), DataValue::Null);
        assert_eq!(model.string_value_at(0, 0), "x");
        assert_eq!(model.string_value_at(1, 0), "");
        assert_eq!(model.identifier_at(1), DataValue::Integer(1));
    }
}
