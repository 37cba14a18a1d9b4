use serde::{Deserialize, Serialize};

/// Sort direction for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
    /// Fall back to model order from this key onward
    Unsorted,
}

impl SortOrder {
    /// The direction an interactive toggle moves to from here
    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending | SortOrder::Unsorted => SortOrder::Ascending,
        }
    }
}

/// A (column, direction) pair
///
/// An ordered list of SortKeys defines primary, secondary, ... tie-break
/// priority. An empty list, or a list whose first key is `Unsorted`, means
/// "use model order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: usize,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(column: usize, order: SortOrder) -> Self {
        Self { column, order }
    }

    pub fn ascending(column: usize) -> Self {
        Self::new(column, SortOrder::Ascending)
    }

    pub fn descending(column: usize) -> Self {
        Self::new(column, SortOrder::Descending)
    }
}
