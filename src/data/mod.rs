//! Event data providers.
//!
//! Defines the `EventSource` trait the HTTP layer reads events through,
//! and the Odds API implementation of it.

pub mod odds_api;

use async_trait::async_trait;

use crate::types::Event;

/// Abstraction over external sporting-event feeds.
///
/// Failures for individual sports are recovered inside the source, so
/// fetching never fails as a whole; at worst it yields fewer events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch events for each sport in order, flattened into one list.
    async fn fetch_events(&self, sports: &[String]) -> Vec<Event>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Split a comma-separated `sports` parameter into codes.
///
/// Codes are trimmed, blanks are dropped and duplicates keep their first
/// position. Returns `None` when nothing usable remains.
pub fn parse_sports(raw: &str) -> Option<Vec<String>> {
    let mut sports: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !sports.iter().any(|s| s == code) {
            sports.push(code.to_string());
        }
    }
    (!sports.is_empty()).then_some(sports)
}
