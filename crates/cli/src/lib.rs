pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "callcenter",
    about = "Call center agent operator CLI",
    long_about = "Inspect configuration, check readiness, and exercise agent actions without a live call.",
    after_help = "Examples:\n  callcenter doctor --json\n  callcenter actions\n  callcenter invoke find_slots 'Ann|1 Main St|rash|john smith'"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, SMS provider readiness, and the availability table")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the action catalog advertised to the LLM as JSON")]
    Actions,
    #[command(about = "Run one action call through the runtime and print its result")]
    Invoke {
        #[arg(help = "Action identifier, e.g. find_slots or send_text")]
        identifier: String,
        #[arg(help = "Pipe-delimited parameter string")]
        input: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Actions => commands::actions::run(),
        Command::Invoke { identifier, input } => commands::invoke::run(&identifier, &input),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
