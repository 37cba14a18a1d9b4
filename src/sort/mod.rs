//! Sort layer: sort keys, row filters, and the view index that maintains
//! the bidirectional mapping between model order and display order.

pub mod observer;
pub mod row_filter;
pub mod sort_key;
pub mod view_index;

pub use observer::ViewObserver;
