use crate::demo::{run_demo, DemoArgs};
use crate::server;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use huntpilot::error::AppError;
use huntpilot::workflows::followups::{cadence_days, evaluate_follow_up, status_or_default};

#[derive(Parser, Debug)]
#[command(
    name = "HuntPilot",
    about = "Track job applications and the follow-ups they are due",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Follow-up cadence utilities
    FollowUp {
        #[command(subcommand)]
        command: FollowUpCommand,
    },
    /// Seed an in-memory tracker with sample applications and print its views
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FollowUpCommand {
    /// Compute when a follow-up is due for a status and reference date
    Due(DueArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct DueArgs {
    /// Application status (APPLIED, OA, INTERVIEW, OFFER, REJECTED)
    #[arg(long)]
    pub(crate) status: String,
    /// Last contact date, or the application date if never contacted (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) base_date: NaiveDate,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::FollowUp {
            command: FollowUpCommand::Due(args),
        } => {
            let today = args.today.unwrap_or_else(|| Local::now().date_naive());
            println!("{}", describe_follow_up(&args.status, args.base_date, today));
            Ok(())
        }
        Command::Demo(args) => run_demo(args),
    }
}

pub(crate) fn describe_follow_up(status: &str, base_date: NaiveDate, today: NaiveDate) -> String {
    let status = status_or_default(status);
    match (
        cadence_days(status),
        evaluate_follow_up(status, base_date, today),
    ) {
        (Some(days), Some(due)) => format!(
            "{status} follow-up every {days} day(s): due {} ({})",
            due.due_at,
            due.urgency.label()
        ),
        _ => format!("{status} applications have no follow-up cadence"),
    }
}
