//! Turning a fixture record into the helper's answer.
//!
//! A fixture's authtype field decides what the helper sends back:
//!
//! | authtype   | answer                                                    |
//! |------------|-----------------------------------------------------------|
//! | `skip`     | nothing added                                             |
//! | empty      | `username` + `password`                                   |
//! | other      | `authtype` + `credential`, if the caller declared support |
//!
//! Values the caller already sent are never overwritten.

use std::collections::HashSet;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CredsError, Result};
use crate::fixture::FixtureRecord;
use crate::protocol::{
    CredentialSet, AUTHTYPE_KEY, CREDENTIAL_KEY, PASSWORD_KEY, USERNAME_KEY, WWWAUTH_KEY,
};

/// Authtype value that tells the helper to answer with nothing.
pub const SKIP_AUTHTYPE: &str = "skip";

/// Prefix a `wwwauth[]` challenge must carry in `required` mode.
const BASIC_CHALLENGE_PREFIX: &str = "Basic ";

/// What a fixture record asks the helper to answer.
#[derive(Clone)]
pub enum Resolution {
    /// Answer without adding any credential.
    Skip,
    /// Plain username/password credentials.
    Implicit {
        username: String,
        password: SecretString,
    },
    /// A scheme-specific credential, only usable by callers that declared
    /// the `authtype` capability.
    Explicit {
        authtype: String,
        credential: SecretString,
    },
}

// Manual Debug implementation to avoid exposing secrets
impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Skip => f.write_str("Skip"),
            Resolution::Implicit { username, .. } => f
                .debug_struct("Implicit")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Resolution::Explicit { authtype, .. } => f
                .debug_struct("Explicit")
                .field("authtype", authtype)
                .field("credential", &"[REDACTED]")
                .finish(),
        }
    }
}

impl From<FixtureRecord> for Resolution {
    fn from(record: FixtureRecord) -> Self {
        match record.authtype.as_str() {
            SKIP_AUTHTYPE => Resolution::Skip,
            "" => Resolution::Implicit {
                username: record.username,
                password: record.credential,
            },
            _ => Resolution::Explicit {
                authtype: record.authtype,
                credential: record.credential,
            },
        }
    }
}

/// Add the resolved credential to `creds`.
///
/// `capabilities` is the set the caller declared; explicit credentials are
/// only added when it contains `authtype`. Keys already present in `creds`
/// keep their values.
pub fn apply_resolution(
    creds: &mut CredentialSet,
    resolution: Resolution,
    capabilities: &HashSet<String>,
) {
    match resolution {
        Resolution::Skip => {
            debug!("Fixture requests skip, adding no credentials");
        }
        Resolution::Implicit { username, password } => {
            creds.insert_if_absent(USERNAME_KEY, username);
            creds.insert_if_absent(PASSWORD_KEY, password.expose_secret());
        }
        Resolution::Explicit {
            authtype,
            credential,
        } => {
            if capabilities.contains(AUTHTYPE_KEY) {
                creds.insert_if_absent(AUTHTYPE_KEY, authtype);
                creds.insert_if_absent(CREDENTIAL_KEY, credential.expose_secret());
            } else {
                debug!(
                    authtype = %authtype,
                    "Caller did not declare authtype capability, adding no credentials"
                );
            }
        }
    }
}

/// How `wwwauth[]` challenges sent by the caller are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WwwAuthMode {
    /// No check.
    #[default]
    Ignore,
    /// A `Basic ` challenge must be present.
    Required,
    /// No challenge may be present.
    Forbidden,
}

impl WwwAuthMode {
    /// Interpret an environment toggle value.
    ///
    /// Anything other than `required` or `forbidden` disables the check.
    pub fn from_toggle(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for WwwAuthMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "required" => Ok(WwwAuthMode::Required),
            "forbidden" => Ok(WwwAuthMode::Forbidden),
            "" | "ignore" => Ok(WwwAuthMode::Ignore),
            other => Err(format!("unknown wwwauth mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for WwwAuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WwwAuthMode::Ignore => write!(f, "ignore"),
            WwwAuthMode::Required => write!(f, "required"),
            WwwAuthMode::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// Check the caller's `wwwauth[]` challenges, then strip them.
///
/// The key is removed from `creds` whatever the mode, since the caller does
/// not expect challenges echoed back. On a violation the set is left as is.
pub fn enforce_wwwauth(creds: &mut CredentialSet, mode: WwwAuthMode) -> Result<()> {
    let challenge = creds.first(WWWAUTH_KEY);

    match mode {
        WwwAuthMode::Required if !challenge.starts_with(BASIC_CHALLENGE_PREFIX) => {
            return Err(CredsError::WwwAuthMissing);
        }
        WwwAuthMode::Forbidden if !challenge.is_empty() => {
            return Err(CredsError::WwwAuthUnexpected);
        }
        _ => {}
    }

    creds.remove(WWWAUTH_KEY);
    Ok(())
}
