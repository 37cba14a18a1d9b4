//! The tabular collaborator trait the sort layer is built against
//!
//! A `ViewIndex` never owns row data; it reads everything through this
//! trait and keeps only index tables of its own.

use crate::data::datatable::DataValue;

/// Read-only access to an externally owned tabular data source.
///
/// Row and column indices are 0-based positions in the model's natural
/// (unsorted, unfiltered) order.
pub trait TableModel {
    /// Total number of rows
    fn row_count(&self) -> usize;

    /// Total number of columns
    fn column_count(&self) -> usize;

    /// Get the typed value of a cell
    /// Returns `DataValue::Null` if the indices are out of bounds
    fn value_at(&self, row: usize, column: usize) -> DataValue;

    /// Get the display string for a cell
    /// Null renders as the empty string
    fn string_value_at(&self, row: usize, column: usize) -> String {
        let value = self.value_at(row, column);
        if value.is_null() {
            String::new()
        } else {
            value.to_string()
        }
    }

    /// An opaque, filter-facing identity for a row, distinct from its
    /// positional index. Defaults to the index itself.
    fn identifier_at(&self, row: usize) -> DataValue {
        DataValue::Integer(row as i64)
    }
}
