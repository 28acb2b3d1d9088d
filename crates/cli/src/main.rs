// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `logi`: inspect and steer a running logistics daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use crate::client::{ClientError, DaemonClient};
use crate::commands::agent::RoleArg;
use crate::commands::job::HistoryArgs;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "logi", version, about = "Turtle logistics coordinator", styles = color::styles())]
struct Cli {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Server summary: uptime, job counts, fleet sizes
    Status,
    /// Jobs waiting for or held by an agent
    Jobs,
    /// Finished jobs, most recent last
    History(HistoryArgs),
    /// Registered turtles
    Agents {
        /// Only this fleet
        #[arg(long)]
        role: Option<RoleArg>,
    },
    /// Drop every pending job
    Clear,
    /// Stop the daemon
    Stop,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |exit| exit.code);
        eprintln!("error: {e:#}");
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.output;
    let client = DaemonClient::connect().map_err(not_running)?;
    let result = match &cli.command {
        Command::Status => commands::status::handle(&client, format).await,
        Command::Jobs => commands::job::list(&client, format).await,
        Command::History(args) => commands::job::history(&client, args, format).await,
        Command::Agents { role } => commands::agent::list(&client, *role, format).await,
        Command::Clear => commands::job::clear(&client, format).await,
        Command::Stop => commands::daemon::stop(&client, format).await,
    };
    result.map_err(|e| match e.downcast::<ClientError>() {
        Ok(client_error) => not_running(client_error),
        Err(other) => other,
    })
}

fn not_running(e: ClientError) -> anyhow::Error {
    match e {
        ClientError::DaemonNotRunning => ExitError::daemon_not_running().into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[yare::parameterized(
        status = { &["logi", "status"] },
        history = { &["logi", "history", "--status", "failed", "-n", "5"] },
        agents = { &["logi", "agents", "--role", "worker"] },
        json = { &["logi", "-o", "json", "jobs"] },
    )]
    fn parses(args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(Cli::try_parse_from(["logi", "agents", "--role", "miner"]).is_err());
    }

    #[test]
    fn not_running_carries_exit_code() {
        let e = not_running(ClientError::DaemonNotRunning);
        let code = e.downcast_ref::<ExitError>().map(|x| x.code);
        assert_eq!(code, Some(exit_error::EXIT_NOT_RUNNING));
        let e = not_running(ClientError::UnexpectedResponse);
        assert!(e.downcast_ref::<ExitError>().is_none());
    }
}
