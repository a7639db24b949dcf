use crate::demo::{
    run_bonus_eligibility, run_bonus_gap, run_bonus_projection, run_demo, run_intake_validation,
    run_monthly_reports, EligibilityArgs, GapArgs, IntakeValidateArgs, ProjectionArgs,
    ReportRunArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use gp_scorecard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "GP Scorecard",
    about = "Score game presenters, validate uploads, and generate monthly team reports",
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
    /// Bonus eligibility, month-end projection, and GG gap calculations
    Bonus {
        #[command(subcommand)]
        command: BonusCommand,
    },
    /// Validate uploaded spreadsheets before import
    Intake {
        #[command(subcommand)]
        command: IntakeCommand,
    },
    /// Monthly team report generation
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },
    /// Walk through the scoring workflows with seeded data
    Demo,
}

#[derive(Subcommand, Debug)]
enum BonusCommand {
    /// Score a completed month
    Eligibility(EligibilityArgs),
    /// Extrapolate month-to-date figures to month end
    Projection(ProjectionArgs),
    /// GGs still needed for a tier
    Gap(GapArgs),
}

#[derive(Subcommand, Debug)]
enum IntakeCommand {
    /// Validate every row of a CSV upload
    Validate(IntakeValidateArgs),
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
    /// Generate reports for the seeded teams once
    Run(ReportRunArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Bonus { command } => match command {
            BonusCommand::Eligibility(args) => run_bonus_eligibility(args),
            BonusCommand::Projection(args) => run_bonus_projection(args),
            BonusCommand::Gap(args) => run_bonus_gap(args),
        },
        Command::Intake {
            command: IntakeCommand::Validate(args),
        } => run_intake_validation(args),
        Command::Reports {
            command: ReportsCommand::Run(args),
        } => run_monthly_reports(args).await,
        Command::Demo => run_demo().await,
    }
}
