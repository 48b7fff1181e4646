pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod export;
pub mod insights;
pub mod leaderboard;
pub mod output;
pub mod report_view;

use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::{
    api::{client::ApiClient, session::Session},
    utils::{dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Workwise", version, long_about = None)]
#[command(about = "Terminal client for the Workwise productivity tracking API", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Base url of the API server. Overrides the stored session url")]
    api_url: Option<String>,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Log in and store the session token")]
    Login {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: String,
    },
    #[command(about = "Request an account. An admin has to approve it before login works")]
    Register {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: String,
        #[arg(long, short)]
        name: String,
    },
    #[command(about = "Forget the stored session")]
    Logout {},
    #[command(about = "Show who the current session is authenticated as")]
    Whoami {},
    #[command(about = "Team dashboard: totals, productivity, trend and top apps")]
    Overview {
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, short, help = "Re-render every 30 seconds until Ctrl-C")]
        watch: bool,
    },
    #[command(about = "One user's day or aggregated range, app by app")]
    Report {
        #[command(flatten)]
        command: report_view::ReportCommand,
    },
    #[command(about = "Server-computed weekly summary for one user")]
    Trend {
        #[arg(long, short, help = "User to inspect. Defaults to the session user")]
        user: Option<String>,
    },
    #[command(about = "Employee management")]
    Employees {
        #[command(subcommand)]
        command: employees::EmployeesCommand,
    },
    #[command(about = "Employees ranked by productivity score")]
    Leaderboard {
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Most used applications over a trailing period")]
    Apps {
        #[arg(long, default_value_t = 7, help = "Trailing period in days")]
        days: u32,
        #[arg(long, default_value_t = 10, help = "Number of apps to show")]
        limit: u32,
        #[arg(long, short, help = "User to inspect. Defaults to the session user")]
        user: Option<String>,
    },
    #[command(about = "Fraud alerts raised over a trailing period")]
    Alerts {
        #[arg(long, default_value_t = 7, help = "Trailing period in days")]
        days: u32,
    },
    #[command(about = "Tracker sync status")]
    Status {},
    #[command(about = "Export reports as CSV")]
    Export {
        #[command(flatten)]
        command: export::ExportCommand,
    },
}

/// Date selection shared by the view commands. The default is yesterday, the
/// last day the server has certainly finished computing.
#[derive(Debug, clap::Args)]
pub struct DateArgs {
    #[arg(
        long,
        short,
        help = "Day to inspect. Examples are \"yesterday\", \"3 days ago\", \"09/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long,
        help = "Aggregate this many consecutive days ending at the selected date"
    )]
    days: Option<u32>,
}

impl DateArgs {
    pub fn end_date(&self) -> Result<NaiveDate> {
        match &self.date {
            Some(raw) => parse_cli_date(raw, self.date_style),
            None => Ok(Local::now().date_naive() - Duration::days(1)),
        }
    }

    pub fn day_count(&self) -> u32 {
        self.days.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

pub fn parse_cli_date(input: &str, style: DateStyle) -> Result<NaiveDate> {
    match parse_date_string(input, Local::now(), style.into()) {
        Ok(parsed) => Ok(parsed.with_timezone(&Local).date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {input}: {e}"),
            )
            .into()),
    }
}

/// State directory plus the client built from the stored session. Every
/// command that talks to the API goes through one of these.
pub struct CliContext {
    pub dir: PathBuf,
    pub client: ApiClient,
}

impl CliContext {
    fn create(api_url: Option<String>) -> Result<Self> {
        let dir = create_application_default_path()?;
        let session = Session::load(&dir, api_url);
        Ok(Self {
            client: ApiClient::new(session),
            dir,
        })
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&create_application_default_path()?, logging_level, args.log)?;

    let ctx = CliContext::create(args.api_url)?;

    match args.commands {
        Commands::Login { email, password } => auth::process_login(ctx, &email, &password).await,
        Commands::Register {
            email,
            password,
            name,
        } => auth::process_register(ctx, &email, &password, &name).await,
        Commands::Logout {} => auth::process_logout(ctx),
        Commands::Whoami {} => auth::process_whoami(ctx).await,
        Commands::Overview { date, watch } => {
            dashboard::process_overview_command(ctx, date, watch).await
        }
        Commands::Report { command } => report_view::process_report_command(ctx, command).await,
        Commands::Trend { user } => dashboard::process_trend_command(ctx, user).await,
        Commands::Employees { command } => {
            employees::process_employees_command(ctx, command).await
        }
        Commands::Leaderboard { date } => {
            leaderboard::process_leaderboard_command(ctx, date).await
        }
        Commands::Apps { days, limit, user } => {
            insights::process_apps_command(ctx, days, limit, user).await
        }
        Commands::Alerts { days } => insights::process_alerts_command(ctx, days).await,
        Commands::Status {} => insights::process_status_command(ctx).await,
        Commands::Export { command } => export::process_export_command(ctx, command).await,
    }
}
