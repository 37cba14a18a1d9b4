//! Data layer: the in-memory tabular model and the trait the sort layer
//! consumes.
//!
//! `DataTable` is the concrete store; `TableModel` is the read-only view of
//! it (or of any other tabular source) that `ViewIndex` works against.

pub mod datatable;
pub mod loaders;
pub mod table_model;
pub mod value_compare;
