use ansi_term::Colour;
use anyhow::Result;

use crate::{
    api::models::{FraudAlert, UserInfo},
    report::aggregate::ReportAggregator,
};

use super::{
    output::{format_seconds, heading, paint_score},
    CliContext, DateArgs,
};

const ALERT_LOOKBACK_DAYS: u32 = 7;

pub async fn process_leaderboard_command(ctx: CliContext, date: DateArgs) -> Result<()> {
    let end = date.end_date()?;
    let day_count = date.day_count();

    let employees: Vec<UserInfo> = ctx
        .client
        .employees()
        .await?
        .into_iter()
        .filter(|e| !e.is_admin())
        .collect();
    let ids: Vec<String> = employees.iter().map(|e| e.id.clone()).collect();

    // the fraud column is best effort, an error just renders everyone as clear
    let alerts = ctx
        .client
        .fraud_alerts(ALERT_LOOKBACK_DAYS)
        .await
        .map(|reply| reply.alerts)
        .unwrap_or_default();

    let aggregator = ReportAggregator::new(ctx.client);
    let reports = aggregator.fetch_for_all_users(&ids, end, day_count).await;

    let mut ranked: Vec<_> = employees
        .iter()
        .map(|employee| {
            let range = &reports[&employee.id];
            (employee, range.score(), range)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    println!();
    println!("{}", heading("Leaderboard · top performers by productivity"));
    println!();
    for (position, (employee, score, range)) in ranked.iter().enumerate() {
        println!(
            "  {}  {} {:>7}  {} apps  {}  {} <{}>",
            rank_badge(position),
            paint_score(*score),
            format_seconds(range.report.total_active_seconds),
            range.report.apps.len(),
            fraud_badge(&alerts, &employee.id),
            employee.name,
            employee.email,
        );
    }
    Ok(())
}

fn rank_badge(position: usize) -> String {
    let label = format!("#{}", position + 1);
    match position {
        0 => Colour::Fixed(220).bold().paint(label).to_string(),
        1 => Colour::Fixed(250).bold().paint(label).to_string(),
        2 => Colour::Fixed(172).bold().paint(label).to_string(),
        _ => label,
    }
}

fn fraud_badge(alerts: &[FraudAlert], user_id: &str) -> String {
    match alerts.iter().find(|alert| alert.user_id == user_id) {
        Some(alert) => Colour::Red
            .paint(format!("⚠ {}", alert.severity))
            .to_string(),
        None => Colour::Green.paint("clear").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::rank_badge;

    #[test]
    fn test_rank_badges_keep_position() {
        assert!(rank_badge(0).contains("#1"));
        assert!(rank_badge(9).contains("#10"));
    }
}
