mod commands;
mod logging;
mod signal;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tinymonitor",
    author,
    version,
    about = "Lightweight system monitoring agent",
    long_about = "TinyMonitor watches CPU, memory, filesystems, load average, disk I/O and \
                  pending reboots, and sends alerts via Ntfy, Google Chat, SMTP, webhooks \
                  and Gotify."
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Start monitoring (default)
    Run,
    /// Validate configuration file
    Validate,
    /// Display configuration summary
    Info,
    /// Send a test alert to verify configuration
    TestAlert {
        /// Test only a specific provider (ntfy, smtp, google_chat, webhook, gotify)
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run::execute(config, cli.verbose).await,
        Command::Validate => Ok(commands::validate::execute(config)),
        Command::Info => commands::info::execute(config),
        Command::TestAlert { provider } => {
            logging::init(cli.verbose, None);
            Ok(commands::test_alert::execute(config, provider.as_deref()).await)
        }
        Command::Version => {
            commands::print_version();
            Ok(ExitCode::SUCCESS)
        }
    }
}
