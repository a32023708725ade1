//! git-credential-lfstest - Mock git credential helper for test suites.
//!
//! The client under test spawns this binary as a credential helper. Instead
//! of consulting a real credential store, `get` answers from fixture files
//! in `$CREDSDIR`; `store` and `erase` are logged and ignored.
//!
//! # Usage
//!
//! ```bash
//! # Seed a fixture: authtype:username:credential
//! echo ":alice:secret" > "$CREDSDIR/example.com"
//!
//! printf 'protocol=https\nhost=example.com\n' | git-credential-lfstest get
//! # protocol=https
//! # host=example.com
//! # username=alice
//! # password=secret
//! ```
//!
//! Received and sent attributes are echoed to stderr as `CREDS RECV:` and
//! `CREDS SEND:` lines. Internal logs go through `tracing` and are off
//! below `warn` unless `RUST_LOG` says otherwise.

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use lfstest_creds_core::{Command, Config, CredsError, Helper};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Mock git credential helper backed by fixture files.
#[derive(Parser, Debug)]
#[command(name = "git-credential-lfstest")]
#[command(about = "Mock git credential helper backed by fixture files")]
#[command(version, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Answer a credential request from fixtures
    Get,
    /// Accept a credential to save (ignored)
    Store,
    /// Accept a credential to forget (ignored)
    Erase,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Get => Command::Get,
            Commands::Store => Command::Store,
            Commands::Erase => Command::Erase,
        }
    }
}

/// Outcome of argument parsing.
#[derive(Debug)]
enum Invocation {
    /// Run a helper command.
    Run(Command),
    /// Clap rendered help or version text; print it and succeed.
    Info(clap::Error),
}

fn setup_logging() {
    // Use RUST_LOG=debug to see fixture resolution; the default keeps stderr
    // limited to the protocol transcript.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Parse the command line.
///
/// Exactly one argument is accepted. Clap's own usage errors are reported as
/// unknown commands so every usage failure exits with status 1.
fn parse_args(args: Vec<OsString>) -> Result<Invocation, CredsError> {
    if args.len() != 2 {
        return Err(CredsError::Usage(args.len()));
    }

    match Cli::try_parse_from(&args) {
        Ok(cli) => Ok(Invocation::Run(cli.command.into())),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Info(e))
        }
        Err(_) => Err(CredsError::UnknownCommand(
            args[1].to_string_lossy().into_owned(),
        )),
    }
}

fn run(args: Vec<OsString>) -> Result<()> {
    let command = match parse_args(args)? {
        Invocation::Run(command) => command,
        Invocation::Info(info) => {
            info.print().context("Failed to print usage")?;
            return Ok(());
        }
    };

    let config = Config::from_env().context("Failed to load configuration")?;
    debug!(?command, ?config, "Starting helper");

    let helper = Helper::new(&config);
    helper.run(
        command,
        io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;

    Ok(())
}

fn main() -> ExitCode {
    setup_logging();

    match run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Helper failed");
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
