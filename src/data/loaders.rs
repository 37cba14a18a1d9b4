//! Load CSV and JSON files into typed DataTables

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::data::datatable::{DataColumn, DataRow, DataTable, DataType, DataValue};

/// Load a CSV file into a DataTable
pub fn load_csv<P: AsRef<Path>>(path: P, table_name: &str) -> Result<DataTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    // Get headers and create columns
    let headers = reader.headers()?.clone();
    let mut table = DataTable::new(table_name);

    table
        .metadata
        .insert("source_type".to_string(), "csv".to_string());
    table.metadata.insert(
        "source_path".to_string(),
        path.as_ref().display().to_string(),
    );

    for header in headers.iter() {
        table.add_column(DataColumn::new(header));
    }

    // Read all rows first to collect data
    let mut string_rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        string_rows.push(row);
    }

    // Infer column types by sampling the data
    let mut column_types = vec![DataType::Null; headers.len()];
    let sample_size = string_rows.len().min(100);

    for row in string_rows.iter().take(sample_size) {
        for (col_idx, value) in row.iter().enumerate() {
            if !value.is_empty() {
                let inferred = DataType::infer_from_string(value);
                column_types[col_idx] = column_types[col_idx].merge(&inferred);
            }
        }
    }

    for (col_idx, column) in table.columns.iter_mut().enumerate() {
        column.data_type = column_types[col_idx].clone();
    }

    // Convert string data to typed DataValues and add rows
    for string_row in string_rows {
        let mut values = Vec::new();
        for (col_idx, value) in string_row.iter().enumerate() {
            values.push(DataValue::from_string(value, &column_types[col_idx]));
        }
        table.add_row(DataRow::new(values))?;
    }

    table.infer_column_types();

    debug!(
        "Loaded CSV '{}': {} rows, {} columns",
        table.name,
        table.row_count(),
        table.column_count()
    );

    Ok(table)
}

/// Load a JSON file (an array of flat objects) into a DataTable
///
/// Columns are taken from the first object's keys; rows missing a key get
/// Null for that column.
pub fn load_json<P: AsRef<Path>>(path: P, table_name: &str) -> Result<DataTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);
    let json: JsonValue =
        serde_json::from_reader(reader).context("Failed to parse JSON")?;

    let array = json
        .as_array()
        .context("Expected a JSON array of row objects")?;

    let mut table = DataTable::new(table_name);
    table
        .metadata
        .insert("source_type".to_string(), "json".to_string());
    table.metadata.insert(
        "source_path".to_string(),
        path.as_ref().display().to_string(),
    );

    let Some(first) = array.first() else {
        return Ok(table);
    };
    let first_obj = first
        .as_object()
        .context("Expected JSON rows to be objects")?;

    for key in first_obj.keys() {
        table.add_column(DataColumn::new(key.clone()));
    }

    for json_row in array {
        let row_obj = json_row
            .as_object()
            .context("Expected JSON rows to be objects")?;

        let mut values = Vec::with_capacity(table.column_count());
        for column in &table.columns {
            let value = row_obj
                .get(&column.name)
                .map(json_value_to_data_value)
                .unwrap_or(DataValue::Null);
            values.push(value);
        }
        table.add_row(DataRow::new(values))?;
    }

    table.infer_column_types();

    debug!(
        "Loaded JSON '{}': {} rows, {} columns",
        table.name,
        table.row_count(),
        table.column_count()
    );

    Ok(table)
}

fn json_value_to_data_value(json: &JsonValue) -> DataValue {
    match json {
        JsonValue::Null => DataValue::Null,
        JsonValue::Bool(b) => DataValue::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                DataValue::Float(f)
            } else {
                DataValue::String(n.to_string())
            }
        }
        JsonValue::String(s) => {
            if DataType::infer_from_string(s) == DataType::DateTime {
                DataValue::DateTime(s.clone())
            } else {
                DataValue::String(s.clone())
            }
        }
        // Store complex types as JSON text
        JsonValue::Array(_) | JsonValue::Object(_) => DataValue::String(json.to_string()),
    }
}
