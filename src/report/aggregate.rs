use std::collections::HashMap;

use chrono::NaiveDate;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    api::{
        client::ApiError,
        models::{AppUsage, DailyReport},
        ReportSource,
    },
    utils::time::{dates_ending_at, range_label},
};

use super::score::productivity_score;

/// How many employees the team trend samples per day. Keeps the request count
/// bounded on large teams.
const TREND_SAMPLE_USERS: usize = 5;

/// Why a day contributed nothing to an aggregation. Kept per day so a caller
/// can still tell "no data" apart from "user was genuinely idle".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoData(String),
    Unauthorized,
    Request(String),
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoData(detail) if detail.is_empty() => write!(f, "no data"),
            SkipReason::NoData(detail) => write!(f, "no data: {detail}"),
            SkipReason::Unauthorized => write!(f, "not authorized"),
            SkipReason::Request(detail) => write!(f, "request failed: {detail}"),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<ApiError> for SkipReason {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::NotFound(detail) => SkipReason::NoData(detail),
            ApiError::Unauthorized => SkipReason::Unauthorized,
            ApiError::Status { status, detail } => {
                SkipReason::Request(format!("{status}: {detail}"))
            }
            ApiError::Transport(e) => SkipReason::Request(e.to_string()),
        }
    }
}

/// Outcome of one day's fetch. Failures are data, not errors: rendering treats
/// a skipped day exactly like a day with zero activity.
#[derive(Debug)]
pub enum DayFetch {
    Fetched(DailyReport),
    Skipped(NaiveDate, SkipReason),
}

/// A date range merged into one report, together with the ledger of days that
/// contributed nothing. `report.date` carries the `"{start}..{end}"` label.
#[derive(Debug)]
pub struct RangeReport {
    pub report: DailyReport,
    pub fetched_days: u32,
    pub skipped: Vec<(NaiveDate, SkipReason)>,
}

impl RangeReport {
    /// True when not a single day of the range produced data. The report then
    /// holds all-zero totals, which is how it renders.
    pub fn is_unavailable(&self) -> bool {
        self.fetched_days == 0
    }

    pub fn score(&self) -> u8 {
        productivity_score(
            self.report.total_active_seconds,
            self.report.total_idle_seconds,
        )
    }
}

/// Average activity of the sampled team members on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub avg_active_seconds: u64,
    pub avg_idle_seconds: u64,
    pub score: u8,
}

/// Turns single-day and day-range requests against a [ReportSource] into
/// merged report values. Holds no state beyond the source and a cancellation
/// token; every aggregation builds its own local accumulator.
pub struct ReportAggregator<S> {
    source: S,
    cancel: CancellationToken,
}

impl<S: ReportSource> ReportAggregator<S> {
    pub fn new(source: S) -> Self {
        Self::with_cancellation(source, CancellationToken::new())
    }

    /// A cancelled token makes every in-flight and future fetch resolve to
    /// [SkipReason::Cancelled] instead of touching the source.
    pub fn with_cancellation(source: S, cancel: CancellationToken) -> Self {
        Self { source, cancel }
    }

    pub async fn fetch_day(&self, date: NaiveDate, user_id: Option<String>) -> DayFetch {
        if self.cancel.is_cancelled() {
            return DayFetch::Skipped(date, SkipReason::Cancelled);
        }
        tokio::select! {
            _ = self.cancel.cancelled() => DayFetch::Skipped(date, SkipReason::Cancelled),
            fetched = self.source.daily_report(date, user_id) => match fetched {
                Ok(report) => DayFetch::Fetched(report),
                Err(e) => {
                    debug!("No report for {date}: {e}");
                    DayFetch::Skipped(date, e.into())
                }
            }
        }
    }

    /// Fetches `day_count` consecutive days ending at `end` (inclusive)
    /// concurrently and merges them. Never fails as a whole; days that fail
    /// contribute zero and land in the skip ledger.
    pub async fn fetch_range(
        &self,
        end: NaiveDate,
        day_count: u32,
        user_id: Option<String>,
    ) -> RangeReport {
        let dates = dates_ending_at(end, day_count);
        let label = range_label(&dates);
        let days = join_all(
            dates
                .iter()
                .map(|date| self.fetch_day(*date, user_id.clone())),
        )
        .await;
        merge_days(label, user_id.unwrap_or_default(), days)
    }

    /// One [RangeReport] per requested user, fetched concurrently. Every user
    /// is present in the result; a user whose every day was skipped carries an
    /// all-zero report with [RangeReport::is_unavailable] set.
    pub async fn fetch_for_all_users(
        &self,
        user_ids: &[String],
        end: NaiveDate,
        day_count: u32,
    ) -> HashMap<String, RangeReport> {
        join_all(user_ids.iter().map(|id| async move {
            (
                id.clone(),
                self.fetch_range(end, day_count, Some(id.clone())).await,
            )
        }))
        .await
        .into_iter()
        .collect()
    }

    /// Per-day team averages over the trailing `days` ending at `end`. Samples
    /// at most [TREND_SAMPLE_USERS] members; days where nobody has data
    /// average to zero.
    pub async fn team_trend(
        &self,
        user_ids: &[String],
        end: NaiveDate,
        days: u32,
    ) -> Vec<TrendPoint> {
        let sample = &user_ids[..user_ids.len().min(TREND_SAMPLE_USERS)];
        join_all(dates_ending_at(end, days).into_iter().map(|date| async move {
            let outcomes = join_all(
                sample
                    .iter()
                    .map(|id| self.fetch_day(date, Some(id.clone()))),
            )
            .await;
            let mut active = 0u64;
            let mut idle = 0u64;
            let mut contributors = 0u64;
            for outcome in outcomes {
                if let DayFetch::Fetched(report) = outcome {
                    active += report.total_active_seconds;
                    idle += report.total_idle_seconds;
                    contributors += 1;
                }
            }
            let (avg_active, avg_idle) = if contributors > 0 {
                (
                    (active as f64 / contributors as f64).round() as u64,
                    (idle as f64 / contributors as f64).round() as u64,
                )
            } else {
                (0, 0)
            };
            TrendPoint {
                date,
                avg_active_seconds: avg_active,
                avg_idle_seconds: avg_idle,
                score: productivity_score(avg_active, avg_idle),
            }
        }))
        .await
    }
}

/// Merges fetched days into one report. Totals are summed; per-app seconds are
/// accumulated by app name across days and the merged list is sorted by
/// descending active seconds. Sub-activities are dropped: their identity
/// across days is ambiguous.
fn merge_days(label: String, user_id: String, days: Vec<DayFetch>) -> RangeReport {
    let mut report = DailyReport::empty(label, user_id);
    let mut apps: HashMap<String, AppUsage> = HashMap::new();
    let mut fetched_days = 0;
    let mut skipped = vec![];

    for day in days {
        match day {
            DayFetch::Fetched(fetched) => {
                fetched_days += 1;
                report.total_hours += fetched.total_hours;
                report.total_active_seconds += fetched.total_active_seconds;
                report.total_idle_seconds += fetched.total_idle_seconds;
                for app in fetched.apps {
                    let merged = apps.entry(app.name.clone()).or_insert_with(|| AppUsage {
                        name: app.name,
                        duration: String::new(),
                        duration_seconds: 0,
                        active_seconds: 0,
                        is_browser: app.is_browser,
                        sub_activities: vec![],
                    });
                    merged.active_seconds += app.active_seconds;
                    merged.duration_seconds += app.duration_seconds;
                }
            }
            DayFetch::Skipped(date, reason) => skipped.push((date, reason)),
        }
    }

    let mut merged: Vec<_> = apps.into_values().collect();
    merged.sort_by(|a, b| b.active_seconds.cmp(&a.active_seconds));
    report.apps = merged;

    RangeReport {
        report,
        fetched_days,
        skipped,
    }
}

/// Sums a set of already-fetched reports into team-level counters.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TeamSummary {
    pub total_active_seconds: u64,
    pub total_idle_seconds: u64,
    pub active_users: usize,
}

impl TeamSummary {
    pub fn score(&self) -> u8 {
        productivity_score(self.total_active_seconds, self.total_idle_seconds)
    }
}

pub fn team_summary<'a>(reports: impl IntoIterator<Item = &'a DailyReport>) -> TeamSummary {
    let mut summary = TeamSummary::default();
    for report in reports {
        summary.total_active_seconds += report.total_active_seconds;
        summary.total_idle_seconds += report.total_idle_seconds;
        if report.total_active_seconds > 0 {
            summary.active_users += 1;
        }
    }
    summary
}

/// App names ranked by active seconds accumulated across all given reports.
pub fn top_apps_across<'a>(
    reports: impl IntoIterator<Item = &'a DailyReport>,
    limit: usize,
) -> Vec<(String, u64)> {
    let mut seconds_by_app: HashMap<&str, u64> = HashMap::new();
    for report in reports {
        for app in &report.apps {
            *seconds_by_app.entry(&app.name).or_default() += app.active_seconds;
        }
    }
    let mut ranked: Vec<_> = seconds_by_app
        .into_iter()
        .map(|(name, seconds)| (name.to_string(), seconds))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use tokio_util::sync::CancellationToken;

    use crate::{
        api::{
            client::ApiError,
            models::{AppUsage, DailyReport},
            MockReportSource,
        },
        utils::logging::TEST_LOGGING,
    };

    use super::{merge_days, team_summary, top_apps_across, DayFetch, ReportAggregator, SkipReason};

    const END: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();

    fn day(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    fn app(name: &str, active: u64, duration: u64) -> AppUsage {
        AppUsage {
            name: name.to_string(),
            duration: String::new(),
            duration_seconds: duration,
            active_seconds: active,
            is_browser: false,
            sub_activities: vec![],
        }
    }

    fn report(date: NaiveDate, active: u64, idle: u64, apps: Vec<AppUsage>) -> DailyReport {
        DailyReport {
            date: day(date),
            total_hours: (active + idle) as f64 / 3600.,
            total_active_seconds: active,
            total_idle_seconds: idle,
            user_id: "u-1".to_string(),
            apps,
        }
    }

    /// Source backed by a per-date table. Dates missing from the table answer
    /// with not-found, same as the real API does for empty days.
    fn table_source(table: HashMap<NaiveDate, DailyReport>) -> MockReportSource {
        let mut source = MockReportSource::new();
        source.expect_daily_report().returning(move |date, _| {
            table
                .get(&date)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("no logs for date".to_string()))
        });
        source
    }

    #[tokio::test]
    async fn test_range_issues_one_fetch_per_day_and_sums() {
        *TEST_LOGGING;
        let mut source = MockReportSource::new();
        source
            .expect_daily_report()
            .times(7)
            .returning(|date, _| Ok(report(date, 100, 50, vec![])));

        let aggregator = ReportAggregator::new(source);
        let range = aggregator.fetch_range(END, 7, Some("u-1".to_string())).await;

        assert_eq!(range.fetched_days, 7);
        assert_eq!(range.report.total_active_seconds, 700);
        assert_eq!(range.report.total_idle_seconds, 350);
        assert_eq!(range.report.date, "2025-03-03..2025-03-09");
        assert!(range.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_failed_day_contributes_zero() {
        *TEST_LOGGING;
        // three days: (100,50), middle one missing, (50,50)
        let mut table = HashMap::new();
        table.insert(END - chrono::Duration::days(2), report(END, 100, 50, vec![]));
        table.insert(END, report(END, 50, 50, vec![]));

        let aggregator = ReportAggregator::new(table_source(table));
        let range = aggregator.fetch_range(END, 3, Some("u-1".to_string())).await;

        assert_eq!(range.report.total_active_seconds, 150);
        assert_eq!(range.report.total_idle_seconds, 100);
        assert_eq!(range.score(), 60);
        assert_eq!(range.fetched_days, 2);
        assert_eq!(
            range.skipped,
            vec![(
                END - chrono::Duration::days(1),
                SkipReason::NoData("no logs for date".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_single_day_range_matches_fetch_day() {
        *TEST_LOGGING;
        let mut table = HashMap::new();
        table.insert(END, report(END, 4000, 1000, vec![app("Chrome", 4000, 4200)]));

        let aggregator = ReportAggregator::new(table_source(table));
        let range = aggregator.fetch_range(END, 1, Some("u-1".to_string())).await;
        let DayFetch::Fetched(single) = aggregator.fetch_day(END, Some("u-1".to_string())).await
        else {
            panic!("single day should be fetched");
        };

        assert_eq!(range.report.total_active_seconds, single.total_active_seconds);
        assert_eq!(range.report.total_idle_seconds, single.total_idle_seconds);
        assert_eq!(range.report.apps.len(), single.apps.len());
        assert_eq!(range.report.date, "2025-03-09..2025-03-09");
    }

    #[test]
    fn test_merge_accumulates_apps_and_sorts() {
        let first = report(
            END,
            100,
            0,
            vec![app("Chrome", 100, 120), app("Terminal", 50, 50)],
        );
        let second = report(
            END,
            200,
            0,
            vec![app("Terminal", 400, 410), app("Slack", 30, 35)],
        );

        let merged = merge_days(
            "label".to_string(),
            "u-1".to_string(),
            vec![DayFetch::Fetched(first), DayFetch::Fetched(second)],
        );

        let names: Vec<_> = merged.report.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Terminal", "Chrome", "Slack"]);
        assert_eq!(merged.report.apps[0].active_seconds, 450);
        assert_eq!(merged.report.apps[0].duration_seconds, 460);
        // merged entries never keep sub-activity detail
        assert!(merged.report.apps.iter().all(|a| a.sub_activities.is_empty()));
    }

    #[test]
    fn test_merge_is_order_independent() {
        let days = || {
            vec![
                report(END, 100, 10, vec![app("Chrome", 100, 100)]),
                report(END, 50, 5, vec![app("Chrome", 30, 30), app("Slack", 20, 25)]),
                report(END, 70, 7, vec![app("Slack", 70, 75)]),
            ]
        };
        let forward = merge_days(
            "l".to_string(),
            "u".to_string(),
            days().into_iter().map(DayFetch::Fetched).collect(),
        );
        let backward = merge_days(
            "l".to_string(),
            "u".to_string(),
            days().into_iter().rev().map(DayFetch::Fetched).collect(),
        );

        assert_eq!(forward.report.total_active_seconds, backward.report.total_active_seconds);
        assert_eq!(forward.report.apps, backward.report.apps);
    }

    #[tokio::test]
    async fn test_all_users_keeps_unavailable_users() {
        *TEST_LOGGING;
        let mut source = MockReportSource::new();
        source.expect_daily_report().returning(|date, user| {
            match user.as_deref() {
                Some("u-1") => Ok(report(date, 100, 100, vec![])),
                _ => Err(ApiError::Status {
                    status: 500,
                    detail: "boom".to_string(),
                }),
            }
        });

        let aggregator = ReportAggregator::new(source);
        let users = vec!["u-1".to_string(), "u-2".to_string()];
        let reports = aggregator.fetch_for_all_users(&users, END, 2).await;

        assert_eq!(reports.len(), 2);
        assert!(!reports["u-1"].is_unavailable());
        assert_eq!(reports["u-1"].report.total_active_seconds, 200);

        let unavailable = &reports["u-2"];
        assert!(unavailable.is_unavailable());
        assert_eq!(unavailable.report.total_active_seconds, 0);
        assert_eq!(unavailable.skipped.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_without_fetching() {
        *TEST_LOGGING;
        let mut source = MockReportSource::new();
        source.expect_daily_report().times(0);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let aggregator = ReportAggregator::with_cancellation(source, cancel);
        let range = aggregator.fetch_range(END, 3, None).await;

        assert!(range.is_unavailable());
        assert!(range
            .skipped
            .iter()
            .all(|(_, reason)| *reason == SkipReason::Cancelled));
    }

    #[tokio::test]
    async fn test_team_trend_averages_per_day() {
        *TEST_LOGGING;
        let mut source = MockReportSource::new();
        // two users, one of which never has data
        source.expect_daily_report().returning(|date, user| {
            match user.as_deref() {
                Some("u-1") => Ok(report(date, 3000, 1000, vec![])),
                _ => Err(ApiError::NotFound("no logs".to_string())),
            }
        });

        let aggregator = ReportAggregator::new(source);
        let users = vec!["u-1".to_string(), "u-2".to_string()];
        let trend = aggregator.team_trend(&users, END, 3).await;

        assert_eq!(trend.len(), 3);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
        for point in trend {
            assert_eq!(point.avg_active_seconds, 3000);
            assert_eq!(point.avg_idle_seconds, 1000);
            assert_eq!(point.score, 75);
        }
    }

    #[test]
    fn test_team_summary_counts_active_users() {
        let reports = [
            report(END, 100, 50, vec![]),
            report(END, 0, 500, vec![]),
            report(END, 300, 50, vec![]),
        ];
        let summary = team_summary(reports.iter());
        assert_eq!(summary.total_active_seconds, 400);
        assert_eq!(summary.total_idle_seconds, 600);
        assert_eq!(summary.active_users, 2);
        assert_eq!(summary.score(), 40);
    }

    #[test]
    fn test_top_apps_across_reports() {
        let reports = [
            report(END, 0, 0, vec![app("Chrome", 100, 0), app("Slack", 70, 0)]),
            report(END, 0, 0, vec![app("Slack", 50, 0), app("Terminal", 90, 0)]),
        ];
        let ranked = top_apps_across(reports.iter(), 2);
        assert_eq!(
            ranked,
            vec![("Slack".to_string(), 120), ("Chrome".to_string(), 100)]
        );
    }
}
