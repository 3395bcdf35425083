use crate::demo::{run_demo, run_tracking_report, DemoArgs, TrackingReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use skincare_tracker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Skincare Tracker",
    about = "Run and explore the skincare routine effectiveness tracker from the command line",
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
    /// Inspect effectiveness tracking for a routine item
    Tracking {
        #[command(subcommand)]
        command: TrackingCommand,
    },
    /// Walk a routine item through a full tracking cycle
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TrackingCommand {
    /// Print the per-concern tracking report for one item
    Report(TrackingReportArgs),
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
        Command::Tracking {
            command: TrackingCommand::Report(args),
        } => run_tracking_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
