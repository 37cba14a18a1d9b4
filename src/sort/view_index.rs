//! The sorted/filtered view index
//!
//! `ViewIndex` maintains a bidirectional mapping between a `TableModel`'s
//! natural row order and a displayed (sorted, optionally filtered) order,
//! and repairs that mapping incrementally when the model reports row
//! insertions, deletions, or updates.
//!
//! The index owns no row data. When neither sort keys nor a filter are
//! active it holds no tables at all and answers queries with the identity
//! mapping. Single-threaded by contract: nothing here suspends, blocks, or
//! expects concurrent callers.

use anyhow::{bail, Result};
use std::cell::Cell;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::data::datatable::DataValue;
use crate::data::table_model::TableModel;
use crate::sort::observer::ViewObserver;
use crate::sort::row_filter::{FilterEntry, RowFilter};
use crate::sort::sort_key::{SortKey, SortOrder};

/// Per-column comparison function over typed cell values
pub type ValueComparator = Arc<dyn Fn(&DataValue, &DataValue) -> Ordering>;

/// Default cap on the number of sort keys retained by interactive toggling
const DEFAULT_MAX_SORT_KEYS: usize = 3;

/// An incremental repair covering more than this fraction of the view falls
/// back to a full rebuild
const FULL_SORT_DIVISOR: usize = 10;

/// One slot of the view→model table. `model_index` is rewritten in place as
/// insertions and deletions shift surrounding rows; the entry itself is
/// never re-created during repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowEntry {
    model_index: usize,
}

/// How to fetch and compare cell values for one column, fixed per rebuild
#[derive(Clone)]
enum CellCompare {
    /// Typed accessor plus the installed comparator
    Typed(ValueComparator),
    /// String accessor with plain string ordering
    AsString,
}

/// Maintains the sorted/filtered view over an externally owned model.
///
/// Operations that read row data take the model as an argument; queries run
/// against the index's own tables in O(1). The caller must forward model
/// mutations via `rows_inserted` / `rows_deleted` / `rows_updated` before
/// trusting subsequent queries.
pub struct ViewIndex {
    /// Row count as of the last rebuild or notification
    model_row_count: usize,
    model_column_count: usize,

    sort_keys: Vec<SortKey>,
    max_sort_keys: usize,
    comparators: Vec<Option<ValueComparator>>,
    sortable: Vec<bool>,
    filter: Option<Box<dyn RowFilter>>,

    /// Sorted view→model table; absent in identity state
    view_to_model: Option<Vec<RowEntry>>,
    /// Inverse table; a None cell means the row is filtered out
    model_to_view: Option<Vec<Option<usize>>>,
    /// Per-column fetch/compare choice cached by the last rebuild
    plan: Vec<CellCompare>,

    sorts_on_updates: bool,
    /// Set when an update arrived while sorts_on_updates was off; forces the
    /// next structural repair to rebuild from scratch
    stale: bool,

    lenient_bounds: bool,
    warned_stale_query: Cell<bool>,

    observers: Vec<Box<dyn ViewObserver>>,
}

impl ViewIndex {
    pub fn new(model: &dyn TableModel) -> Self {
        let columns = model.column_count();
        Self {
            model_row_count: model.row_count(),
            model_column_count: columns,
            sort_keys: Vec::new(),
            max_sort_keys: DEFAULT_MAX_SORT_KEYS,
            comparators: (0..columns).map(|_| None).collect(),
            sortable: vec![true; columns],
            filter: None,
            view_to_model: None,
            model_to_view: None,
            plan: Vec::new(),
            sorts_on_updates: true,
            stale: false,
            lenient_bounds: false,
            warned_stale_query: Cell::new(false),
            observers: Vec::new(),
        }
    }

    // ---------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------

    /// Replace the active sort key list.
    ///
    /// Every key's column must be within the model's column range. If the
    /// list actually changes, observers are notified and the view is
    /// re-derived: a full rebuild when no tables exist yet, a re-sort of the
    /// existing (already filtered) entries otherwise.
    pub fn set_sort_keys(&mut self, model: &dyn TableModel, keys: Vec<SortKey>) -> Result<()> {
        let columns = model.column_count();
        for key in &keys {
            if key.column >= columns {
                bail!(
                    "Sort key column {} out of bounds (model has {} columns)",
                    key.column,
                    columns
                );
            }
        }

        let mut keys = keys;
        if keys.len() > self.max_sort_keys {
            debug!(
                "Truncating {} sort keys to the maximum of {}",
                keys.len(),
                self.max_sort_keys
            );
            keys.truncate(self.max_sort_keys);
        }
        if keys == self.sort_keys {
            return Ok(());
        }

        self.sort_keys = keys;
        self.fire_sort_keys_changed();

        if self.is_transformed() {
            self.sort_existing_data(model);
        } else {
            self.sort(model);
        }
        Ok(())
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort_keys
    }

    /// Install or remove a per-column comparator.
    ///
    /// Does not trigger a re-sort; callers may batch several configuration
    /// changes and then call `sort` once.
    pub fn set_comparator(
        &mut self,
        column: usize,
        comparator: Option<ValueComparator>,
    ) -> Result<()> {
        if column >= self.model_column_count {
            bail!(
                "Column {} out of bounds (model has {} columns)",
                column,
                self.model_column_count
            );
        }
        self.comparators[column] = comparator;
        Ok(())
    }

    pub fn comparator(&self, column: usize) -> Option<ValueComparator> {
        self.comparators.get(column).and_then(|c| c.clone())
    }

    /// Install or remove the row filter; always triggers a full rebuild
    pub fn set_row_filter(&mut self, model: &dyn TableModel, filter: Option<Box<dyn RowFilter>>) {
        self.filter = filter;
        self.sort(model);
    }

    /// Toggle whether a column participates in interactive sort toggling.
    /// Has no effect on explicitly set sort keys.
    pub fn set_sortable(&mut self, column: usize, sortable: bool) -> Result<()> {
        if column >= self.model_column_count {
            bail!(
                "Column {} out of bounds (model has {} columns)",
                column,
                self.model_column_count
            );
        }
        self.sortable[column] = sortable;
        Ok(())
    }

    pub fn is_sortable(&self, column: usize) -> bool {
        self.sortable.get(column).copied().unwrap_or(false)
    }

    /// Interactive sort toggle: promote the column to primary ascending, or
    /// flip its direction if it is already the primary key. Ignored for
    /// columns marked unsortable.
    pub fn toggle_sort_column(&mut self, model: &dyn TableModel, column: usize) -> Result<()> {
        if column >= model.column_count() {
            bail!(
                "Column {} out of bounds (model has {} columns)",
                column,
                model.column_count()
            );
        }
        if !self.is_sortable(column) {
            return Ok(());
        }

        let mut keys = self.sort_keys.clone();
        match keys.iter().position(|k| k.column == column) {
            Some(0) => keys[0].order = keys[0].order.toggled(),
            Some(pos) => {
                let mut key = keys.remove(pos);
                key.order = SortOrder::Ascending;
                keys.insert(0, key);
            }
            None => keys.insert(0, SortKey::ascending(column)),
        }
        keys.truncate(self.max_sort_keys);
        self.set_sort_keys(model, keys)
    }

    /// Cap the number of sort keys retained by `set_sort_keys` and
    /// `toggle_sort_column`; applies from the next change onward.
    pub fn set_max_sort_keys(&mut self, max: usize) -> Result<()> {
        if max == 0 {
            bail!("max_sort_keys must be at least 1");
        }
        self.max_sort_keys = max;
        Ok(())
    }

    pub fn max_sort_keys(&self) -> usize {
        self.max_sort_keys
    }

    /// When off, update notifications mark the view stale instead of
    /// repairing it; the next structural change rebuilds from scratch.
    pub fn set_sorts_on_updates(&mut self, sorts_on_updates: bool) {
        self.sorts_on_updates = sorts_on_updates;
    }

    pub fn sorts_on_updates(&self) -> bool {
        self.sorts_on_updates
    }

    /// Opt into the legacy best-effort identity query: a view index beyond
    /// the last known model row count is returned unchanged after a one-time
    /// warning instead of failing. Off by default.
    pub fn set_lenient_bounds(&mut self, lenient: bool) {
        self.lenient_bounds = lenient;
    }

    pub fn add_observer(&mut self, observer: Box<dyn ViewObserver>) {
        self.observers.push(observer);
    }

    /// The model's column set changed wholesale: re-snapshot counts, clamp
    /// per-column state, drop sort keys for vanished columns, and rebuild if
    /// a view is active.
    pub fn model_structure_changed(&mut self, model: &dyn TableModel) {
        self.model_row_count = model.row_count();
        self.model_column_count = model.column_count();
        self.comparators
            .resize_with(self.model_column_count, || None);
        self.sortable.resize(self.model_column_count, true);
        self.sort_keys.retain(|k| k.column < self.model_column_count);
        if self.is_transformed() {
            self.sort(model);
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Number of rows in the view (after filtering)
    pub fn view_row_count(&self) -> usize {
        match &self.view_to_model {
            Some(entries) => entries.len(),
            None => self.model_row_count,
        }
    }

    /// Number of rows in the model as of the last notification
    pub fn model_row_count(&self) -> usize {
        self.model_row_count
    }

    /// True when no sort and no filter are active and no tables exist
    pub fn is_identity(&self) -> bool {
        self.view_to_model.is_none()
    }

    /// Map a view row to its model row. O(1).
    pub fn view_to_model_index(&self, view_index: usize) -> Result<usize> {
        if let Some(entries) = &self.view_to_model {
            return match entries.get(view_index) {
                Some(entry) => Ok(entry.model_index),
                None => bail!(
                    "View index {} out of bounds (view has {} rows)",
                    view_index,
                    entries.len()
                ),
            };
        }
        if view_index < self.model_row_count {
            return Ok(view_index);
        }
        if self.lenient_bounds {
            if !self.warned_stale_query.get() {
                self.warned_stale_query.set(true);
                warn!(
                    "View index {} is beyond the last known model row count {}; \
                     returning it unchanged (lenient bounds)",
                    view_index, self.model_row_count
                );
            }
            return Ok(view_index);
        }
        bail!(
            "View index {} out of bounds (model has {} rows)",
            view_index,
            self.model_row_count
        )
    }

    /// Map a model row to its view row. O(1). `Ok(None)` means the row is
    /// filtered out of the view.
    pub fn model_to_view_index(&self, model_index: usize) -> Result<Option<usize>> {
        if let Some(table) = &self.model_to_view {
            return match table.get(model_index) {
                Some(cell) => Ok(*cell),
                None => bail!(
                    "Model index {} out of bounds (model has {} rows)",
                    model_index,
                    table.len()
                ),
            };
        }
        if model_index < self.model_row_count {
            return Ok(Some(model_index));
        }
        bail!(
            "Model index {} out of bounds (model has {} rows)",
            model_index,
            self.model_row_count
        )
    }

    /// Snapshot of the current view→model mapping as plain model indices;
    /// the identity mapping is materialized on demand
    pub fn view_to_model(&self) -> Vec<usize> {
        match &self.view_to_model {
            Some(entries) => entries.iter().map(|e| e.model_index).collect(),
            None => (0..self.model_row_count).collect(),
        }
    }

    // ---------------------------------------------------------------
    // Full rebuild
    // ---------------------------------------------------------------

    /// Sort and filter from scratch.
    ///
    /// New tables are built into locals and committed only at the end, so a
    /// panicking user comparator leaves the previously committed tables
    /// intact.
    pub fn sort(&mut self, model: &dyn TableModel) {
        let previous = self.view_snapshot();

        self.model_row_count = model.row_count();
        if model.column_count() != self.model_column_count {
            self.model_column_count = model.column_count();
            self.comparators
                .resize_with(self.model_column_count, || None);
            self.sortable.resize(self.model_column_count, true);
        }
        self.cache_comparison_plan();

        if !self.uses_sorting() && self.filter.is_none() {
            self.view_to_model = None;
            self.model_to_view = None;
            debug!("View index reset to identity ({} rows)", self.model_row_count);
        } else if !self.uses_sorting() {
            // Filter only: scan model order, assigning consecutive view rows
            let mut entries = Vec::new();
            let mut model_to_view = vec![None; self.model_row_count];
            for m in 0..self.model_row_count {
                if self.include(model, m) {
                    model_to_view[m] = Some(entries.len());
                    entries.push(RowEntry { model_index: m });
                }
            }
            debug!(
                "Filtered view rebuilt: {} of {} rows visible",
                entries.len(),
                self.model_row_count
            );
            self.view_to_model = Some(entries);
            self.model_to_view = Some(model_to_view);
        } else {
            let mut entries: Vec<RowEntry> = (0..self.model_row_count)
                .filter(|&m| self.include(model, m))
                .map(|m| RowEntry { model_index: m })
                .collect();
            entries.sort_by(|a, b| self.compare_rows(model, a.model_index, b.model_index));
            let model_to_view = invert(&entries, self.model_row_count);
            debug!(
                "Sorted view rebuilt: {} of {} rows visible, {} sort keys",
                entries.len(),
                self.model_row_count,
                self.sort_keys.len()
            );
            self.view_to_model = Some(entries);
            self.model_to_view = Some(model_to_view);
        }

        self.stale = false;
        self.fire_view_sorted(previous);
    }

    /// Re-sort the existing entries without re-running the filter; used when
    /// only the sort keys changed, since filter membership is unaffected
    fn sort_existing_data(&mut self, model: &dyn TableModel) {
        if !self.uses_sorting() && self.filter.is_none() {
            self.sort(model);
            return;
        }
        let previous = self.view_snapshot();
        self.cache_comparison_plan();

        // Clone, sort, commit: a panicking comparator cannot corrupt the
        // live tables
        let mut entries = match &self.view_to_model {
            Some(entries) => entries.clone(),
            None => {
                self.sort(model);
                return;
            }
        };
        entries.sort_by(|a, b| self.compare_rows(model, a.model_index, b.model_index));
        let model_to_view = invert(&entries, self.model_row_count);
        self.view_to_model = Some(entries);
        self.model_to_view = Some(model_to_view);
        self.stale = false;
        self.fire_view_sorted(previous);
    }

    // ---------------------------------------------------------------
    // Incremental repair
    // ---------------------------------------------------------------

    /// Rows `[first, last]` were inserted into the model (range in
    /// post-insertion coordinates).
    pub fn rows_inserted(
        &mut self,
        model: &dyn TableModel,
        first: usize,
        last: usize,
    ) -> Result<()> {
        let new_count = model.row_count();
        if first > last || last >= new_count {
            bail!(
                "Invalid insertion range [{}, {}] for model with {} rows",
                first,
                last,
                new_count
            );
        }
        let delta = last - first + 1;
        self.model_row_count = new_count;

        if !self.is_transformed() {
            return Ok(());
        }
        if self.should_rebuild(first, last) {
            debug!(
                "Insertion of {} rows too large for incremental repair; full rebuild",
                delta
            );
            self.sort(model);
            return Ok(());
        }

        let previous = self.view_snapshot();
        let mut entries = match &self.view_to_model {
            Some(entries) => entries.clone(),
            None => return Ok(()),
        };

        // Existing rows at or past the insertion point moved down
        for entry in &mut entries {
            if entry.model_index >= first {
                entry.model_index += delta;
            }
        }

        // Splice each new visible row in at its sorted position
        for m in first..=last {
            if self.include(model, m) {
                let pos = entries.partition_point(|e| {
                    self.compare_rows(model, e.model_index, m) == Ordering::Less
                });
                entries.insert(pos, RowEntry { model_index: m });
            }
        }

        let model_to_view = invert(&entries, new_count);
        self.view_to_model = Some(entries);
        self.model_to_view = Some(model_to_view);
        self.fire_view_sorted(previous);
        Ok(())
    }

    /// Rows `[first, last]` were deleted from the model (range in
    /// pre-deletion coordinates).
    pub fn rows_deleted(
        &mut self,
        model: &dyn TableModel,
        first: usize,
        last: usize,
    ) -> Result<()> {
        if first > last || last >= self.model_row_count {
            bail!(
                "Invalid deletion range [{}, {}] for model with {} rows",
                first,
                last,
                self.model_row_count
            );
        }
        let delta = last - first + 1;
        let new_count = self.model_row_count - delta;
        self.model_row_count = new_count;

        if !self.is_transformed() {
            return Ok(());
        }
        if self.should_rebuild(first, last) {
            debug!(
                "Deletion of {} rows too large for incremental repair; full rebuild",
                delta
            );
            self.sort(model);
            return Ok(());
        }

        let previous = self.view_snapshot();
        let mut entries = match &self.view_to_model {
            Some(entries) => entries.clone(),
            None => return Ok(()),
        };

        // Drop deleted rows, then shift survivors up; relative order (and
        // therefore sortedness) is preserved
        entries.retain(|e| e.model_index < first || e.model_index > last);
        for entry in &mut entries {
            if entry.model_index > last {
                entry.model_index -= delta;
            }
        }

        let model_to_view = invert(&entries, new_count);
        self.view_to_model = Some(entries);
        self.model_to_view = Some(model_to_view);
        self.fire_view_sorted(previous);
        Ok(())
    }

    /// Rows `[first, last]` changed content in place; their view position
    /// and (if a filter is installed) visibility may change.
    pub fn rows_updated(
        &mut self,
        model: &dyn TableModel,
        first: usize,
        last: usize,
    ) -> Result<()> {
        if first > last || last >= self.model_row_count {
            bail!(
                "Invalid update range [{}, {}] for model with {} rows",
                first,
                last,
                self.model_row_count
            );
        }
        if !self.is_transformed() {
            return Ok(());
        }
        if !self.sorts_on_updates {
            self.stale = true;
            return Ok(());
        }
        let delta = last - first + 1;
        if self.should_rebuild(first, last) {
            debug!(
                "Update of {} rows too large for incremental repair; full rebuild",
                delta
            );
            self.sort(model);
            return Ok(());
        }

        let previous = self.view_snapshot();
        let mut entries = match &self.view_to_model {
            Some(entries) => entries.clone(),
            None => return Ok(()),
        };

        // Extract the affected rows, then splice back those that (still)
        // pass the filter; handles position and visibility changes uniformly
        entries.retain(|e| e.model_index < first || e.model_index > last);
        for m in first..=last {
            if self.include(model, m) {
                let pos = entries.partition_point(|e| {
                    self.compare_rows(model, e.model_index, m) == Ordering::Less
                });
                entries.insert(pos, RowEntry { model_index: m });
            }
        }

        let model_to_view = invert(&entries, self.model_row_count);
        self.view_to_model = Some(entries);
        self.model_to_view = Some(model_to_view);
        self.fire_view_sorted(previous);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn is_transformed(&self) -> bool {
        self.view_to_model.is_some()
    }

    /// Sort keys demand an actual sort (not model order)
    fn uses_sorting(&self) -> bool {
        self.sort_keys
            .first()
            .is_some_and(|k| k.order != SortOrder::Unsorted)
    }

    /// Incremental repair assumes small deltas; a stale view or a range over
    /// a tenth of the view size goes through a full rebuild instead
    fn should_rebuild(&self, first: usize, last: usize) -> bool {
        if self.stale {
            return true;
        }
        let view_len = self.view_to_model.as_ref().map_or(0, |v| v.len());
        last - first > view_len / FULL_SORT_DIVISOR
    }

    fn include(&self, model: &dyn TableModel, model_index: usize) -> bool {
        match &self.filter {
            Some(filter) => filter.include(&FilterEntry::new(model, model_index)),
            None => true,
        }
    }

    fn cache_comparison_plan(&mut self) {
        self.plan = (0..self.model_column_count)
            .map(|c| match self.comparators.get(c).and_then(|o| o.as_ref()) {
                Some(cmp) => CellCompare::Typed(Arc::clone(cmp)),
                None => CellCompare::AsString,
            })
            .collect();
    }

    /// Compare two model rows under the active sort keys.
    ///
    /// Walks the key list in priority order, short-circuiting on the first
    /// non-equal result; an Unsorted key and the final fallback both defer
    /// to model order, which makes the relation a total order regardless of
    /// user comparators.
    fn compare_rows(&self, model: &dyn TableModel, a: usize, b: usize) -> Ordering {
        for key in &self.sort_keys {
            if key.order == SortOrder::Unsorted {
                return a.cmp(&b);
            }
            let result = match self.plan.get(key.column) {
                Some(CellCompare::Typed(cmp)) => {
                    let va = model.value_at(a, key.column);
                    let vb = model.value_at(b, key.column);
                    match (va.is_null(), vb.is_null()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        (false, false) => cmp(&va, &vb),
                    }
                }
                _ => {
                    let va = model.string_value_at(a, key.column);
                    let vb = model.string_value_at(b, key.column);
                    va.cmp(&vb)
                }
            };
            let result = if key.order == SortOrder::Descending {
                result.reverse()
            } else {
                result
            };
            if result != Ordering::Equal {
                return result;
            }
        }
        // Stable fallback to model order
        a.cmp(&b)
    }

    fn view_snapshot(&self) -> Vec<usize> {
        match &self.view_to_model {
            Some(entries) => entries.iter().map(|e| e.model_index).collect(),
            None => Vec::new(),
        }
    }

    fn fire_sort_keys_changed(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.sort_keys_changed();
        }
    }

    fn fire_view_sorted(&mut self, previous: Vec<usize>) {
        for observer in self.observers.iter_mut() {
            observer.view_sorted(&previous);
        }
    }
}

/// Derive the model→view table from a sorted entry list
fn invert(entries: &[RowEntry], model_rows: usize) -> Vec<Option<usize>> {
    let mut model_to_view = vec![None; model_rows];
    for (view_index, entry) in entries.iter().enumerate() {
        model_to_view[entry.model_index] = Some(view_index);
    }
    model_to_view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::{DataColumn, DataRow, DataTable};

    fn table_of(values: &[&str]) -> DataTable {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("v"));
        for v in values {
            table
                .add_row(DataRow::new(vec![DataValue::String(v.to_string())]))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_identity_until_configured() {
        let table = table_of(&["b", "a", "c"]);
        let index = ViewIndex::new(&table);

        assert!(index.is_identity());
        assert_eq!(index.view_row_count(), 3);
        assert_eq!(index.view_to_model_index(2).unwrap(), 2);
        assert_eq!(index.model_to_view_index(1).unwrap(), Some(1));
        assert!(index.view_to_model_index(3).is_err());
    }

    #[test]
    fn test_invalid_sort_key_rejected_before_mutation() {
        let table = table_of(&["b", "a"]);
        let mut index = ViewIndex::new(&table);

        let result = index.set_sort_keys(&table, vec![SortKey::ascending(5)]);
        assert!(result.is_err());
        assert!(index.is_identity());
        assert!(index.sort_keys().is_empty());
    }

    #[test]
    fn test_set_comparator_does_not_resort() {
        let table = table_of(&["b", "a"]);
        let mut index = ViewIndex::new(&table);
        index
            .set_sort_keys(&table, vec![SortKey::ascending(0)])
            .unwrap();
        assert_eq!(index.view_to_model(), vec![1, 0]);

        // Install a reversing comparator; the view must not move until an
        // explicit sort
        index
            .set_comparator(0, Some(Arc::new(|a, b| {
                crate::data::value_compare::compare_values(b, a)
            })))
            .unwrap();
        assert_eq!(index.view_to_model(), vec![1, 0]);

        index.sort(&table);
        assert_eq!(index.view_to_model(), vec![0, 1]);
    }

    #[test]
    fn test_unsorted_key_falls_back_to_model_order() {
        let table = table_of(&["b", "a", "c"]);
        let mut index = ViewIndex::new(&table);
        index
            .set_sort_keys(&table, vec![SortKey::new(0, SortOrder::Unsorted)])
            .unwrap();

        // First key unsorted means model order; no tables needed
        assert!(index.is_identity());
        assert_eq!(index.view_to_model(), vec![0, 1, 2]);
    }

    #[test]
    fn test_max_sort_keys_truncation() {
        let mut table = DataTable::new("test");
        for name in ["a", "b", "c", "d", "e"] {
            table.add_column(DataColumn::new(name));
        }
        table
            .add_row(DataRow::new(vec![DataValue::Null; 5]))
            .unwrap();

        let mut index = ViewIndex::new(&table);
        index
            .set_sort_keys(
                &table,
                (0..5).map(SortKey::ascending).collect(),
            )
            .unwrap();
        assert_eq!(index.sort_keys().len(), 3);

        index.set_max_sort_keys(1).unwrap();
        index
            .set_sort_keys(&table, vec![SortKey::ascending(0), SortKey::ascending(1)])
            .unwrap();
        assert_eq!(index.sort_keys().len(), 1);

        assert!(index.set_max_sort_keys(0).is_err());
    }

    #[test]
    fn test_toggle_sort_column() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("a"));
        table.add_column(DataColumn::new("b"));
        table
            .add_row(DataRow::new(vec![DataValue::Null, DataValue::Null]))
            .unwrap();

        let mut index = ViewIndex::new(&table);

        index.toggle_sort_column(&table, 0).unwrap();
        assert_eq!(index.sort_keys(), &[SortKey::ascending(0)]);

        index.toggle_sort_column(&table, 0).unwrap();
        assert_eq!(index.sort_keys(), &[SortKey::descending(0)]);

        index.toggle_sort_column(&table, 1).unwrap();
        assert_eq!(
            index.sort_keys(),
            &[SortKey::ascending(1), SortKey::descending(0)]
        );

        // Unsortable columns are ignored by toggling but not by set_sort_keys
        index.set_sortable(1, false).unwrap();
        index.toggle_sort_column(&table, 1).unwrap();
        assert_eq!(
            index.sort_keys(),
            &[SortKey::ascending(1), SortKey::descending(0)]
        );
        index
            .set_sort_keys(&table, vec![SortKey::ascending(1)])
            .unwrap();
        assert_eq!(index.sort_keys(), &[SortKey::ascending(1)]);
    }

    #[test]
    fn test_lenient_bounds_warns_and_passes_through() {
        let table = table_of(&["a", "b"]);
        let mut index = ViewIndex::new(&table);

        assert!(index.view_to_model_index(5).is_err());

        index.set_lenient_bounds(true);
        assert_eq!(index.view_to_model_index(5).unwrap(), 5);
        // Second call takes the already-warned path
        assert_eq!(index.view_to_model_index(6).unwrap(), 6);
    }

    #[test]
    fn test_malformed_ranges_rejected() {
        let table = table_of(&["a", "b", "c"]);
        let mut index = ViewIndex::new(&table);
        index
            .set_sort_keys(&table, vec![SortKey::ascending(0)])
            .unwrap();
        let before = index.view_to_model();

        assert!(index.rows_inserted(&table, 2, 1).is_err());
        assert!(index.rows_inserted(&table, 0, 10).is_err());
        assert!(index.rows_deleted(&table, 2, 1).is_err());
        assert!(index.rows_deleted(&table, 0, 10).is_err());
        assert!(index.rows_updated(&table, 2, 1).is_err());
        assert!(index.rows_updated(&table, 0, 10).is_err());

        assert_eq!(index.view_to_model(), before);
    }

    #[test]
    fn test_stale_view_forces_full_rebuild() {
        let mut table = table_of(&["c", "a", "b"]);
        let mut index = ViewIndex::new(&table);
        index
            .set_sort_keys(&table, vec![SortKey::ascending(0)])
            .unwrap();
        index.set_sorts_on_updates(false);

        // Update arrives while update sorting is off: view goes stale
        table
            .set_value(1, 0, DataValue::String("z".to_string()))
            .unwrap();
        index.rows_updated(&table, 1, 1).unwrap();
        assert_eq!(index.view_to_model(), vec![1, 2, 0]); // untouched

        // Next structural change repairs via full rebuild
        table
            .insert_row(3, DataRow::new(vec![DataValue::String("d".to_string())]))
            .unwrap();
        index.rows_inserted(&table, 3, 3).unwrap();
        assert_eq!(index.view_to_model(), vec![2, 0, 3, 1]); // b, c, d, z
    }

    #[test]
    fn test_model_structure_changed_drops_vanished_keys() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("a"));
        table.add_column(DataColumn::new("b"));
        table
            .add_row(DataRow::new(vec![
                DataValue::Integer(1),
                DataValue::Integer(2),
            ]))
            .unwrap();

        let mut index = ViewIndex::new(&table);
        index
            .set_sort_keys(&table, vec![SortKey::ascending(1), SortKey::ascending(0)])
            .unwrap();

        table.columns.truncate(1);
        for row in &mut table.rows {
            row.values.truncate(1);
        }
        index.model_structure_changed(&table);

        assert_eq!(index.sort_keys(), &[SortKey::ascending(0)]);
        assert!(index.set_sort_keys(&table, vec![SortKey::ascending(1)]).is_err());
    }
}
