use anyhow::Result;
use clap::Subcommand;

use crate::{
    api::models::UserInfo,
    report::aggregate::ReportAggregator,
};

use super::{
    output::{format_seconds, heading, paint_score, score_meter},
    CliContext, DateArgs,
};

#[derive(Debug, Subcommand)]
pub enum EmployeesCommand {
    #[command(about = "Employee table with activity for a day or range")]
    List {
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Account requests waiting for approval")]
    Pending {},
    #[command(about = "Approve a pending account")]
    Approve { user_id: String },
    #[command(about = "Reject a pending account")]
    Reject { user_id: String },
    #[command(about = "Remove an employee and their data")]
    Delete {
        user_id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn process_employees_command(ctx: CliContext, command: EmployeesCommand) -> Result<()> {
    match command {
        EmployeesCommand::List { date } => list_employees(ctx, date).await,
        EmployeesCommand::Pending {} => list_pending(ctx).await,
        EmployeesCommand::Approve { user_id } => {
            let reply = ctx.client.approve_user(&user_id).await?;
            println!("{}", non_empty(reply.message, "Approved"));
            Ok(())
        }
        EmployeesCommand::Reject { user_id } => {
            let reply = ctx.client.reject_user(&user_id).await?;
            println!("{}", non_empty(reply.message, "Rejected"));
            Ok(())
        }
        EmployeesCommand::Delete { user_id, yes } => delete_employee(ctx, &user_id, yes).await,
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

async fn list_employees(ctx: CliContext, date: DateArgs) -> Result<()> {
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

    let aggregator = ReportAggregator::new(ctx.client);
    let reports = aggregator.fetch_for_all_users(&ids, end, day_count).await;

    println!();
    println!("{}", heading(&format!("{} employees", employees.len())));
    println!();
    for employee in &employees {
        let range = &reports[&employee.id];
        let report = &range.report;
        let score = range.score();
        let status = if report.total_active_seconds > 0 {
            "active"
        } else if range.is_unavailable() {
            "no data"
        } else {
            "inactive"
        };
        println!(
            "  {}\t{:<8}\t{:>7}\t{} {}\t{} apps\t{} <{}>",
            employee.id,
            status,
            format_seconds(report.total_active_seconds),
            score_meter(score, 10),
            paint_score(score),
            report.apps.len(),
            employee.name,
            employee.email,
        );
    }
    Ok(())
}

async fn list_pending(ctx: CliContext) -> Result<()> {
    let pending = ctx.client.pending_users().await?;
    if pending.is_empty() {
        println!("No pending account requests");
        return Ok(());
    }
    println!();
    println!("{}", heading(&format!("{} pending request(s)", pending.len())));
    for user in &pending {
        println!(
            "  {}\t{} <{}>{}",
            user.id,
            user.name,
            user.email,
            user.created_at
                .as_deref()
                .map(|at| format!("\trequested {at}"))
                .unwrap_or_default(),
        );
    }
    println!();
    println!("Approve with `workwise employees approve <id>`");
    Ok(())
}

async fn delete_employee(ctx: CliContext, user_id: &str, yes: bool) -> Result<()> {
    if !yes {
        println!("This removes the employee and their tracked data. Re-run with --yes to confirm.");
        return Ok(());
    }
    let reply = ctx.client.delete_user(user_id).await?;
    println!("{}", non_empty(reply.message, "Deleted"));
    Ok(())
}
