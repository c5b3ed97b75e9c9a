pub mod commands;

use clap::{ArgGroup, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "hilight",
    about = "Hilight insurance recommender CLI",
    long_about = "Browse the tag taxonomy, run recommendations against the catalog, and check runtime readiness.",
    after_help = "Examples:\n  hilight tags --interest 운전\n  hilight recommend --tag risk:#화재 --tag risk:#배상책임 --explain\n  hilight doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load config and catalog and emit the startup announcement")]
    Init,
    #[command(about = "List interests in display order")]
    Interests,
    #[command(
        about = "Show the tag preview of an interest or every tag of a category",
        group(ArgGroup::new("scope").required(true).args(["interest", "category"]))
    )]
    Tags {
        #[arg(long, help = "Interest label, e.g. 운전")]
        interest: Option<String>,
        #[arg(long, help = "Category label or alias: who|risk|priority|change")]
        category: Option<String>,
    },
    #[command(about = "Recommend a product for the selected tags")]
    Recommend {
        #[arg(
            long = "tag",
            value_name = "CATEGORY:TAG",
            required = true,
            help = "Selected tag, repeatable"
        )]
        tags: Vec<String>,
        #[arg(long, help = "Include every product's score breakdown")]
        explain: bool,
    },
    #[command(about = "Validate config, catalog, credentials, and local log readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

/// Diagnostics go to stderr so command output stays parseable.
///
/// Returns `false` when a global subscriber was already installed; that
/// subscriber keeps its settings.
fn init_logging() -> bool {
    let filter =
        EnvFilter::try_from_env("HILIGHT_CLI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .try_init()
        .is_ok()
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    if !init_logging() {
        tracing::debug!(
            event_name = "cli.logging.preinstalled",
            "keeping the existing tracing subscriber"
        );
    }

    let result = match cli.command {
        Command::Init => commands::init::run(),
        Command::Interests => commands::interests::run(),
        Command::Tags { interest, category } => {
            commands::tags::run(interest.as_deref(), category.as_deref())
        }
        Command::Recommend { tags, explain } => commands::recommend::run(&tags, explain),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn second_logging_init_keeps_existing_subscriber() {
        init_logging();
        assert!(!init_logging());
    }
}
