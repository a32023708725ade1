//! The helper commands.
//!
//! `get` reads the caller's attributes, resolves a fixture, and answers with
//! the augmented attributes. `store` and `erase` are accepted and ignored,
//! since fixtures are never written.

use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, info};

use crate::assembly::{apply_resolution, enforce_wwwauth, Resolution, WwwAuthMode};
use crate::capability::negotiate_capabilities;
use crate::config::Config;
use crate::error::{CredsError, Result};
use crate::fixture::FixtureStore;
use crate::protocol::{read_credentials, write_credentials, CredentialSet, HOST_KEY, PATH_KEY};

/// A credential helper command, as passed by the calling client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Look up a credential.
    Get,
    /// Save a credential that worked.
    Store,
    /// Forget a credential that was rejected.
    Erase,
}

impl FromStr for Command {
    type Err = CredsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get" => Ok(Command::Get),
            "store" => Ok(Command::Store),
            "erase" => Ok(Command::Erase),
            other => Err(CredsError::UnknownCommand(other.to_string())),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Get => write!(f, "get"),
            Command::Store => write!(f, "store"),
            Command::Erase => write!(f, "erase"),
        }
    }
}

/// The host part of a `host` attribute, without any `:port` suffix.
pub fn host_segment(host: &str) -> &str {
    host.split_once(':').map_or(host, |(name, _)| name)
}

/// A fixture-backed credential helper.
#[derive(Debug, Clone)]
pub struct Helper {
    store: FixtureStore,
    wwwauth: WwwAuthMode,
}

impl Helper {
    /// Create a helper from resolved configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_store(FixtureStore::new(config.creds_dir()), config.wwwauth_mode())
    }

    /// Create a helper over an explicit fixture store.
    pub fn with_store(store: FixtureStore, wwwauth: WwwAuthMode) -> Self {
        Self { store, wwwauth }
    }

    /// Run `command`.
    ///
    /// Protocol output goes to `out`; the `CREDS ...` transcript goes to
    /// `transcript`. Nothing is written to `out` unless the whole command
    /// succeeds.
    pub fn run<R, O, W>(
        &self,
        command: Command,
        input: R,
        out: &mut O,
        transcript: &mut W,
    ) -> Result<()>
    where
        R: BufRead,
        O: Write + ?Sized,
        W: Write + ?Sized,
    {
        match command {
            Command::Get => self.fill(input, out, transcript),
            Command::Store | Command::Erase => log_ignored(command, transcript),
        }
    }

    /// Serve a `get`: read attributes, answer from fixtures, write them back.
    pub fn fill<R, O, W>(&self, input: R, out: &mut O, transcript: &mut W) -> Result<()>
    where
        R: BufRead,
        O: Write + ?Sized,
        W: Write + ?Sized,
    {
        let creds = read_credentials(input, transcript)?;
        let answer = self.answer(creds)?;
        write_credentials(&answer, out, transcript)
    }

    /// Compute the answer to a `get` request.
    pub fn answer(&self, mut creds: CredentialSet) -> Result<CredentialSet> {
        let host = host_segment(creds.first(HOST_KEY));
        let path = creds.first(PATH_KEY);
        debug!(host, path, dir = %self.store.dir().display(), "Resolving fixture");

        let resolution = Resolution::from(self.store.lookup(host, path)?);
        let capabilities = negotiate_capabilities(&mut creds);

        apply_resolution(&mut creds, resolution, &capabilities);
        enforce_wwwauth(&mut creds, self.wwwauth)?;

        Ok(creds)
    }
}

/// Acknowledge a command that has no effect on fixtures.
pub fn log_ignored<W: Write + ?Sized>(command: Command, transcript: &mut W) -> Result<()> {
    info!(%command, "Ignoring command");
    writeln!(transcript, "CREDS received command: {} (ignored)", command)
        .map_err(CredsError::Output)
}
