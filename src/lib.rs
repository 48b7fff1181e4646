//! Terminal client for the Workwise productivity tracking API.
//! Fetches the server's per-day reports, aggregates them client-side into
//! range summaries and scores, and renders the admin console's views
//! (overview, employees, leaderboard, exports) in a terminal.
//!

pub mod api;
pub mod cli;
pub mod report;
pub mod utils;
