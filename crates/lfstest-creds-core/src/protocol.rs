//! The line-oriented `key=value` protocol spoken by git credential helpers.
//!
//! Git writes one attribute per line on the helper's standard input and reads
//! the (possibly augmented) attributes back from its standard output. Keys
//! ending in `[]` may repeat; every occurrence is kept in arrival order.
//!
//! Every line received or sent is also echoed to a diagnostic transcript
//! (`CREDS RECV: ...` / `CREDS SEND: ...`), which test suites inspect on the
//! helper's stderr.

use std::io::{BufRead, Write};

use crate::error::{CredsError, Result};

/// Key carrying the capabilities the caller understands.
pub const CAPABILITY_KEY: &str = "capability[]";

/// Key carrying `WWW-Authenticate` challenges seen by the caller.
pub const WWWAUTH_KEY: &str = "wwwauth[]";

/// Key carrying the remote host, optionally with a `:port` suffix.
pub const HOST_KEY: &str = "host";

/// Key carrying the repository path on the remote.
pub const PATH_KEY: &str = "path";

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const AUTHTYPE_KEY: &str = "authtype";
pub const CREDENTIAL_KEY: &str = "credential";

/// A multi-valued attribute map exchanged over the helper protocol.
///
/// Keys keep the order in which they were first seen; keys added after the
/// input was read are appended. Values for a key keep their arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    entries: Vec<(String, Vec<String>)>,
}

impl CredentialSet {
    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`, creating the key if needed.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Set `key` to a single value unless the key is already present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.entries.push((key.to_string(), vec![value.into()]));
        true
    }

    /// Replace every value of `key`.
    ///
    /// An empty `values` list removes the key entirely. A key that is not yet
    /// present is appended.
    pub fn set(&mut self, key: &str, values: Vec<String>) {
        if values.is_empty() {
            self.remove(key);
            return;
        }
        match self.position(key) {
            Some(idx) => self.entries[idx].1 = values,
            None => self.entries.push((key.to_string(), values)),
        }
    }

    /// Remove `key`, returning its values if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    /// All values for `key`, or an empty slice.
    pub fn get(&self, key: &str) -> &[String] {
        self.position(key)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    /// The first value for `key`, or `""` when the key is absent.
    pub fn first(&self, key: &str) -> &str {
        self.get(key).first().map(String::as_str).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Iterate over keys and their values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

/// Split one protocol line into its key and trimmed value.
///
/// The line is split on the first `=`; the key is kept verbatim.
pub fn parse_line(line: &str) -> Result<(&str, &str)> {
    match line.split_once('=') {
        Some((key, value)) => Ok((key, value.trim())),
        None => Err(CredsError::BadLine(line.to_string())),
    }
}

/// Read `key=value` lines until end of input.
///
/// Each accepted line is echoed to `transcript`. The first malformed line
/// aborts the read.
pub fn read_credentials<R, W>(input: R, transcript: &mut W) -> Result<CredentialSet>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut creds = CredentialSet::new();

    for line in input.lines() {
        let line = line.map_err(CredsError::Stdin)?;
        let (key, value) = parse_line(&line)?;

        writeln!(transcript, "CREDS RECV: {}", line).map_err(CredsError::Output)?;
        creds.push(key, value);
    }

    Ok(creds)
}

/// Write a credential set back in protocol form.
///
/// `capability[]` lines go first so the caller can negotiate in one pass;
/// the remaining keys follow in set order. Each line is echoed to
/// `transcript` before it is written to `out`.
pub fn write_credentials<O, W>(creds: &CredentialSet, out: &mut O, transcript: &mut W) -> Result<()>
where
    O: Write + ?Sized,
    W: Write + ?Sized,
{
    for capability in creds.get(CAPABILITY_KEY) {
        send_line(CAPABILITY_KEY, capability, out, transcript)?;
    }

    for (key, values) in creds.iter().filter(|(key, _)| *key != CAPABILITY_KEY) {
        for value in values {
            send_line(key, value, out, transcript)?;
        }
    }

    out.flush().map_err(CredsError::Output)
}

fn send_line<O, W>(key: &str, value: &str, out: &mut O, transcript: &mut W) -> Result<()>
where
    O: Write + ?Sized,
    W: Write + ?Sized,
{
    writeln!(transcript, "CREDS SEND: {}={}", key, value).map_err(CredsError::Output)?;
    writeln!(out, "{}={}", key, value).map_err(CredsError::Output)
}
