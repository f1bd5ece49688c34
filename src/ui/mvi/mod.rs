//! Unidirectional state primitives for the viewer.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ render
//!    ↑                              │
//!    └──── keys, screen updates ────┘
//! ```
//!
//! The reducer is the only place state changes. Side effects (reading the
//! screen, quitting the loop) happen in the runtime around `reduce`.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
