//! Calls to the remote Workwise REST API.
//! [client::ApiClient] is the main artifact of this module. The
//! [ReportSource] trait abstracts the one call the aggregation layer needs,
//! so it can be tested without a server.

pub mod client;
pub mod models;
pub mod session;

use async_trait::async_trait;
use chrono::NaiveDate;

use client::ApiError;
use models::DailyReport;

/// Supplies one daily report per (date, user) pair. `None` for the user means
/// "whoever the session is authenticated as", resolved by the server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn daily_report(
        &self,
        date: NaiveDate,
        user_id: Option<String>,
    ) -> Result<DailyReport, ApiError>;
}
