// LogDash - app/mod.rs
//
// Application layer: dashboard view-model and its background-call driver.
// Dependencies: core layer (state machines and remote traits).
// Must NOT depend on: platform specifics.

pub mod dashboard;
pub mod state;
