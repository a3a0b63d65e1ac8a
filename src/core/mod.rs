// LogDash - core/mod.rs
//
// Core business logic layer: the scope cascade, filter state and search
// bookkeeping.
// Must NOT depend on: app, platform, or perform any I/O directly.

pub mod cascade;
pub mod export;
pub mod filter;
pub mod model;
pub mod remote;
pub mod search;
pub mod sequence;
