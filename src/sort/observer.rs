/// Receives view index change notifications.
///
/// `view_sorted` carries the pre-change view→model mapping as plain model
/// indices so observers can compute a minimal diff against the new mapping.
/// The slice is empty when the index was previously in identity state.
pub trait ViewObserver {
    /// The active sort key list was replaced
    fn sort_keys_changed(&mut self) {}

    /// The view was rebuilt or repaired
    fn view_sorted(&mut self, previous_view_to_model: &[usize]) {
        let _ = previous_view_to_model;
    }
}
