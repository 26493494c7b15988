pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "glidedesk",
    about = "GlideDesk operator CLI",
    long_about = "Operate the GlideDesk support orchestrator: terminal chat, config inspection, and readiness checks.",
    after_help = "Examples:\n  glidedesk doctor --json\n  glidedesk config\n  glidedesk chat --user 8700"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Chat with the support orchestrator from the terminal")]
    Chat {
        #[arg(long, default_value = "8700", help = "User id for the session")]
        user: String,
    },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
    #[command(about = "Validate config and support-runtime readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { user } => commands::chat::run(user),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
