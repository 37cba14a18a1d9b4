use crate::data::datatable::DataValue;
use crate::data::table_model::TableModel;

/// Read-only view of one model row, handed to filter predicates.
///
/// Borrows the model; nothing is allocated per row.
pub struct FilterEntry<'a> {
    model: &'a dyn TableModel,
    model_index: usize,
}

impl<'a> FilterEntry<'a> {
    pub fn new(model: &'a dyn TableModel, model_index: usize) -> Self {
        Self { model, model_index }
    }

    /// Typed value of the given column for this row
    pub fn value(&self, column: usize) -> DataValue {
        self.model.value_at(self.model_index, column)
    }

    /// Display string of the given column for this row
    pub fn string_value(&self, column: usize) -> String {
        self.model.string_value_at(self.model_index, column)
    }

    /// Number of columns this row has values for
    pub fn value_count(&self) -> usize {
        self.model.column_count()
    }

    /// The model's opaque identity for this row
    pub fn identifier(&self) -> DataValue {
        self.model.identifier_at(self.model_index)
    }

    pub fn model_index(&self) -> usize {
        self.model_index
    }
}

/// Decides which model rows are visible in the view
pub trait RowFilter {
    fn include(&self, entry: &FilterEntry<'_>) -> bool;
}

impl<F> RowFilter for F
where
    F: Fn(&FilterEntry<'_>) -> bool,
{
    fn include(&self, entry: &FilterEntry<'_>) -> bool {
        self(entry)
    }
}

/// Substring filter over one column or all columns
#[derive(Debug, Clone)]
pub struct TextFilter {
    pattern: String,
    column: Option<usize>, // None = search all columns
    case_sensitive: bool,
}

impl TextFilter {
    pub fn new(pattern: impl Into<String>, column: Option<usize>) -> Self {
        Self {
            pattern: pattern.into(),
            column,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    fn matches(&self, text: &str) -> bool {
        if self.case_sensitive {
            text.contains(&self.pattern)
        } else {
            text.to_lowercase().contains(&self.pattern.to_lowercase())
        }
    }
}

impl RowFilter for TextFilter {
    fn include(&self, entry: &FilterEntry<'_>) -> bool {
        match self.column {
            Some(col) => self.matches(&entry.string_value(col)),
            None => (0..entry.value_count()).any(|col| self.matches(&entry.string_value(col))),
        }
    }
}
