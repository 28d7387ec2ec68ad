use crate::lead::{run_lead_score, LeadScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use contact_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Contact Intake Service",
    about = "Run the contact intake service or score leads from the command line",
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
    /// Inspect lead prioritization without submitting anything
    Lead {
        #[command(subcommand)]
        command: LeadCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LeadCommand {
    /// Score a lead from its classification fields and print the breakdown
    Score(LeadScoreArgs),
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
        Command::Lead {
            command: LeadCommand::Score(args),
        } => run_lead_score(args),
    }
}
