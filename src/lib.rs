//! BETDESK: bet placement and odds proxy backend
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod fees;
pub mod storage;
pub mod data;
pub mod api;
