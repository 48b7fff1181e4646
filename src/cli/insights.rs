use anyhow::Result;

use super::{
    output::{format_seconds, heading, scaled_bar},
    CliContext,
};

pub async fn process_apps_command(
    ctx: CliContext,
    days: u32,
    limit: u32,
    user: Option<String>,
) -> Result<()> {
    let top = ctx.client.top_apps(days, limit, user).await?;

    println!();
    println!(
        "{}",
        heading(&format!("Top apps · last {} day(s)", top.period_days))
    );
    println!();
    let max = top
        .apps
        .iter()
        .map(|app| app.duration_seconds)
        .max()
        .unwrap_or(0);
    for app in &top.apps {
        println!(
            "  {} {:>7}  {}{}",
            scaled_bar(app.duration_seconds, max, 16),
            format_seconds(app.duration_seconds),
            app.app_name,
            if app.is_browser { " (browser)" } else { "" },
        );
    }
    Ok(())
}

pub async fn process_alerts_command(ctx: CliContext, days: u32) -> Result<()> {
    let reply = ctx.client.fraud_alerts(days).await?;

    println!();
    println!(
        "{}",
        heading(&format!(
            "{} alert(s), {} user(s) affected over {} day(s)",
            reply.summary.total_alerts, reply.summary.users_affected, reply.summary.period_days
        ))
    );
    for alert in &reply.alerts {
        println!();
        println!(
            "  {}  {}  {} ({}x)",
            alert.date, alert.severity, alert.user_email, alert.fraud_count
        );
        if !alert.message.is_empty() {
            println!("      {}", alert.message);
        }
        if !alert.fraud_types.is_empty() {
            println!("      types: {}", alert.fraud_types.join(", "));
        }
    }
    Ok(())
}

pub async fn process_status_command(ctx: CliContext) -> Result<()> {
    let status = ctx.client.sync_status().await?;
    println!("logs total:  {}", status.total_logs);
    println!("logs today:  {}", status.today_logs);
    println!(
        "last sync:   {}",
        status.last_sync.as_deref().unwrap_or("never")
    );
    Ok(())
}
