use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::{
    api::{client::ApiClient, models::UserInfo},
    report::aggregate::{team_summary, top_apps_across, ReportAggregator, TrendPoint},
    utils::time::date_to_api_string,
};

use super::{
    output::{format_seconds, heading, paint_score, scaled_bar, score_meter},
    CliContext, DateArgs,
};

/// The web dashboard refreshed on this fixed interval, regardless of whether
/// the previous fetch succeeded. Watch mode keeps that behavior.
const WATCH_INTERVAL: Duration = Duration::from_secs(30);
const TREND_DAYS: u32 = 7;
const TOP_APPS_SHOWN: usize = 8;

pub async fn process_overview_command(ctx: CliContext, date: DateArgs, watch: bool) -> Result<()> {
    let end = date.end_date()?;
    let day_count = date.day_count();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        }
    });

    let me = ctx.client.me().await?;
    let is_admin = me.role == "admin";
    let aggregator = ReportAggregator::with_cancellation(ctx.client.clone(), cancel.clone());

    loop {
        let rendered = if is_admin {
            render_team_overview(&ctx.client, &aggregator, end, day_count).await
        } else {
            render_personal_overview(&aggregator, end, day_count).await
        };
        match rendered {
            Ok(()) => {}
            Err(e) if watch => eprintln!("refresh failed: {e}"),
            Err(e) => return Err(e),
        }

        if !watch || cancel.is_cancelled() {
            return Ok(());
        }
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(WATCH_INTERVAL) => {}
        }
    }
}

fn span_label(end: NaiveDate, day_count: u32) -> String {
    if day_count == 1 {
        date_to_api_string(end)
    } else {
        format!("{day_count} days ending {}", date_to_api_string(end))
    }
}

async fn render_team_overview(
    client: &ApiClient,
    aggregator: &ReportAggregator<ApiClient>,
    end: NaiveDate,
    day_count: u32,
) -> Result<()> {
    let employees: Vec<UserInfo> = client
        .employees()
        .await?
        .into_iter()
        .filter(|e| !e.is_admin())
        .collect();
    let pending = client.pending_users().await.map(|p| p.len()).unwrap_or(0);

    let ids: Vec<String> = employees.iter().map(|e| e.id.clone()).collect();
    let reports = aggregator.fetch_for_all_users(&ids, end, day_count).await;
    let summary = team_summary(reports.values().map(|r| &r.report));
    let score = summary.score();

    println!();
    println!("{}", heading(&format!("Team overview · {}", span_label(end, day_count))));
    println!();
    println!("  Active time       {}", format_seconds(summary.total_active_seconds));
    println!("  Idle time         {}", format_seconds(summary.total_idle_seconds));
    println!("  Active members    {}/{}", summary.active_users, employees.len());
    println!("  Team productivity {} {}", score_meter(score, 20), paint_score(score));
    if pending > 0 {
        println!("  {pending} account request(s) pending approval, see `workwise employees pending`");
    }

    let trend = aggregator.team_trend(&ids, end, TREND_DAYS).await;
    println!();
    println!("{}", heading("Trend (team average per day)"));
    print_trend(&trend);

    let ranked = top_apps_across(reports.values().map(|r| &r.report), TOP_APPS_SHOWN);
    if !ranked.is_empty() {
        println!();
        println!("{}", heading("Top apps"));
        let max = ranked.first().map(|(_, seconds)| *seconds).unwrap_or(0);
        for (name, seconds) in ranked {
            println!(
                "  {} {:>7}  {}",
                scaled_bar(seconds, max, 16),
                format_seconds(seconds),
                name
            );
        }
    }
    Ok(())
}

async fn render_personal_overview(
    aggregator: &ReportAggregator<ApiClient>,
    end: NaiveDate,
    day_count: u32,
) -> Result<()> {
    let range = aggregator.fetch_range(end, day_count, None).await;
    let report = &range.report;
    let score = range.score();

    println!();
    println!("{}", heading(&format!("Your activity · {}", span_label(end, day_count))));
    println!();
    println!("  Active time   {}", format_seconds(report.total_active_seconds));
    println!("  Idle time     {}", format_seconds(report.total_idle_seconds));
    println!("  Apps used     {}", report.apps.len());
    println!("  Productivity  {} {}", score_meter(score, 20), paint_score(score));
    if !range.skipped.is_empty() {
        println!("  ({} of {} day(s) had no data)", range.skipped.len(), day_count);
    }

    if !report.apps.is_empty() {
        println!();
        println!("{}", heading("Top apps"));
        let max = report.apps.first().map(|a| a.active_seconds).unwrap_or(0);
        for app in report.apps.iter().take(TOP_APPS_SHOWN) {
            println!(
                "  {} {:>7}  {}",
                scaled_bar(app.active_seconds, max, 16),
                format_seconds(app.active_seconds),
                app.name
            );
        }
    }
    Ok(())
}

fn print_trend(trend: &[TrendPoint]) {
    let max = trend
        .iter()
        .map(|p| p.avg_active_seconds)
        .max()
        .unwrap_or(0);
    for point in trend {
        println!(
            "  {}  {} {:>7}  {}",
            point.date.format("%a %d/%m"),
            scaled_bar(point.avg_active_seconds, max, 16),
            format_seconds(point.avg_active_seconds),
            paint_score(point.score),
        );
    }
}

pub async fn process_trend_command(ctx: CliContext, user: Option<String>) -> Result<()> {
    let summary = ctx.client.weekly_summary(user).await?;

    println!();
    println!(
        "{}",
        heading(&format!(
            "Weekly summary · {}..{}",
            summary.start_date, summary.end_date
        ))
    );
    let max_minutes = summary
        .daily_data
        .iter()
        .map(|d| (d.active_hours * 60.) as u64)
        .max()
        .unwrap_or(0);
    for day in &summary.daily_data {
        println!(
            "  {}  {}  {:.1}h active of {:.1}h tracked ({} logs)",
            day.date,
            scaled_bar((day.active_hours * 60.) as u64, max_minutes, 16),
            day.active_hours,
            day.total_hours,
            day.total_logs,
        );
    }
    Ok(())
}
