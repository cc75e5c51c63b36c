// Gantry - a partial-update dispatch layer for server-rendered fragments
//
// One endpoint serves many named actions: a marker header classifies the
// request, a registry resolves the action name to a handler, and the
// handler's fetch/submit state machine renders the fragment.

// Re-export core functionality
pub use gantry_core::*;

// Re-export optional crates
#[cfg(feature = "handlebars")]
pub use gantry_handlebars;
