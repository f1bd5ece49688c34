/// Marker for a complete, renderable UI state.
///
/// Cloned on every transition; the viewer loop compares it with the last
/// drawn state to skip redundant redraws.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
