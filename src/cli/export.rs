use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    api::models::UserInfo,
    report::aggregate::{DayFetch, ReportAggregator},
    utils::time::{date_to_api_string, dates_ending_at, today},
};

use super::{
    output::csv::{summary_records_csv, team_summary_csv, SummaryRecord},
    CliContext, DateArgs,
};

const ALERT_LOOKBACK_DAYS: u32 = 7;

#[derive(Debug, Parser)]
pub struct ExportCommand {
    #[command(flatten)]
    date: DateArgs,
    #[arg(
        long,
        help = "One row per employee per day instead of one merged row per employee"
    )]
    detailed: bool,
    #[arg(long, short, help = "Only export this employee")]
    user: Option<String>,
    #[arg(long, short, help = "Output file. Defaults to workwise-<span>-<today>.csv")]
    out: Option<PathBuf>,
}

pub async fn process_export_command(
    ctx: CliContext,
    ExportCommand {
        date,
        detailed,
        user,
        out,
    }: ExportCommand,
) -> Result<()> {
    let end = date.end_date()?;
    let day_count = date.day_count();

    let employees: Vec<UserInfo> = ctx
        .client
        .employees()
        .await?
        .into_iter()
        .filter(|e| !e.is_admin())
        .filter(|e| user.as_deref().map_or(true, |id| e.id == id))
        .collect();
    anyhow::ensure!(!employees.is_empty(), "no employees matched the export");

    let alerts = ctx
        .client
        .fraud_alerts(ALERT_LOOKBACK_DAYS)
        .await
        .map(|reply| reply.alerts)
        .unwrap_or_default();

    let aggregator = ReportAggregator::new(ctx.client);

    let span = if day_count == 1 {
        date_to_api_string(end)
    } else {
        format!("{day_count}d-ending-{}", date_to_api_string(end))
    };
    let (csv, rows) = if detailed {
        let mut records = vec![];
        for employee in &employees {
            for day in dates_ending_at(end, day_count) {
                // days without data produce no row, same as the web export
                if let DayFetch::Fetched(report) =
                    aggregator.fetch_day(day, Some(employee.id.clone())).await
                {
                    records.push(SummaryRecord::from_report(
                        employee,
                        date_to_api_string(day),
                        &report,
                    ));
                }
            }
        }
        (summary_records_csv(&records), records.len())
    } else {
        let ids: Vec<String> = employees.iter().map(|e| e.id.clone()).collect();
        let reports = aggregator.fetch_for_all_users(&ids, end, day_count).await;
        (
            team_summary_csv(
                &employees,
                |id| reports.get(id).map(|range| range.report.clone()),
                &alerts,
            ),
            employees.len(),
        )
    };

    let out = out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "workwise-{}{span}-{}.csv",
            if detailed { "detailed-" } else { "" },
            date_to_api_string(today()),
        ))
    });
    std::fs::write(&out, csv).with_context(|| format!("Can't write export to {out:?}"))?;
    println!("Wrote {rows} row(s) to {}", out.display());
    Ok(())
}
