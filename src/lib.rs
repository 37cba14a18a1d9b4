pub mod data;
pub mod sort;

pub use data::datatable::{DataColumn, DataRow, DataTable, DataType, DataValue};
pub use data::table_model::TableModel;
pub use sort::row_filter::{FilterEntry, RowFilter, TextFilter};
pub use sort::sort_key::{SortKey, SortOrder};
pub use sort::view_index::{ValueComparator, ViewIndex};
pub use sort::ViewObserver;
