use anyhow::Result;
use clap::Parser;

use crate::{
    api::models::DailyReport,
    report::aggregate::{DayFetch, RangeReport, ReportAggregator},
    report::score::productivity_score,
    utils::{
        percentage::{seconds_share, Percentage},
        time::date_to_api_string,
    },
};

use super::{
    output::{format_seconds, heading, paint_score},
    CliContext, DateArgs,
};

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[command(flatten)]
    date: DateArgs,
    #[arg(
        long,
        short,
        help = "User to inspect (admin only). Defaults to the session user"
    )]
    user: Option<String>,
    #[arg(short = 'p', long = "min-share", help = "Filter apps below this share of total active time", default_value_t = Percentage::new_opt(1.).unwrap())]
    min_share: Percentage,
    #[arg(
        long,
        help = "Show sub-activity detail (browser tabs). Only present on single-day reports"
    )]
    sub_activities: bool,
}

pub async fn process_report_command(
    ctx: CliContext,
    ReportCommand {
        date,
        user,
        min_share,
        sub_activities,
    }: ReportCommand,
) -> Result<()> {
    let end = date.end_date()?;
    let day_count = date.day_count();
    let aggregator = ReportAggregator::new(ctx.client);

    if day_count == 1 {
        match aggregator.fetch_day(end, user).await {
            DayFetch::Fetched(report) => {
                print_report(&report, min_share, sub_activities);
            }
            DayFetch::Skipped(date, reason) => {
                println!("No data for {} ({reason})", date_to_api_string(date));
            }
        }
        return Ok(());
    }

    let range = aggregator.fetch_range(end, day_count, user).await;
    // merged ranges never carry sub-activity detail
    print_report(&range.report, min_share, false);
    print_skip_ledger(&range);
    Ok(())
}

fn print_report(report: &DailyReport, min_share: Percentage, sub_activities: bool) {
    let score = productivity_score(report.total_active_seconds, report.total_idle_seconds);

    println!();
    println!("{}", heading(&format!("Report · {}", report.date)));
    println!();
    println!("  Active time   {}", format_seconds(report.total_active_seconds));
    println!("  Idle time     {}", format_seconds(report.total_idle_seconds));
    println!("  Productivity  {}", paint_score(score));

    // source order is not meaningful, re-sort before display
    let mut apps: Vec<_> = report.apps.iter().collect();
    apps.sort_by(|a, b| b.active_seconds.cmp(&a.active_seconds));

    let shown: Vec<_> = apps
        .iter()
        .copied()
        .filter(|app| {
            seconds_share(app.active_seconds, report.total_active_seconds) >= min_share
        })
        .collect();

    if shown.is_empty() {
        return;
    }
    println!();
    for app in &shown {
        let share = seconds_share(app.active_seconds, report.total_active_seconds);
        println!(
            "  {:>3.0}%\t{:>7}\t{}{}",
            *share,
            format_seconds(app.active_seconds),
            app.name,
            if app.is_browser { " (browser)" } else { "" },
        );
        if sub_activities {
            for sub in &app.sub_activities {
                println!(
                    "      \t{:>7}\t  {}",
                    format_seconds(sub.duration_seconds),
                    sub.name
                );
            }
        }
    }
    if shown.len() < apps.len() {
        println!("  ({} app(s) below {min_share} hidden)", apps.len() - shown.len());
    }
}

fn print_skip_ledger(range: &RangeReport) {
    if range.skipped.is_empty() {
        return;
    }
    println!();
    for (date, reason) in &range.skipped {
        println!("  no data for {}: {reason}", date_to_api_string(*date));
    }
}
