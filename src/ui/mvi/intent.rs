/// Marker for things that can change UI state: key presses, screen
/// updates arriving from the broadcaster.
pub trait Intent: Send + 'static {}
