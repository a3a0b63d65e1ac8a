// LogDash - platform/mod.rs
//
// Platform layer: HTTP transport and configuration files.
// Dependencies: core model types and the remote traits they implement.
// Must NOT depend on: app.

pub mod api;
pub mod config;
