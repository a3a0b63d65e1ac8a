// LogDash - lib.rs
//
// Library entry point, exposing the dashboard state machine, its HTTP
// transport and ambient utilities for the CLI and integration tests.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
