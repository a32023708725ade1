//! Core of a mock git credential helper for test suites.
//!
//! The helper answers `git credential` style requests from flat fixture
//! files instead of a real credential store, so client test suites can
//! exercise their credential handling without secrets or network access.
//!
//! # Modules
//!
//! - [`protocol`]: The `key=value` line protocol (`CredentialSet`)
//! - [`fixture`]: Fixture file lookup by host and path (`FixtureStore`)
//! - [`capability`]: Capability negotiation with the caller
//! - [`assembly`]: Building the answer (`Resolution`, `WwwAuthMode`)
//! - [`helper`]: The `get` / `store` / `erase` commands (`Helper`)
//! - [`config`]: Environment and TOML configuration
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```no_run
//! use lfstest_creds_core::{Command, Config, Helper};
//!
//! let config = Config::from_env()?;
//! let helper = Helper::new(&config);
//! helper.run(
//!     Command::Get,
//!     std::io::stdin().lock(),
//!     &mut std::io::stdout().lock(),
//!     &mut std::io::stderr().lock(),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembly;
pub mod capability;
pub mod config;
pub mod error;
pub mod fixture;
pub mod helper;
pub mod protocol;

// Re-export commonly used types at the crate root for convenience
pub use assembly::{apply_resolution, enforce_wwwauth, Resolution, WwwAuthMode};
pub use capability::{negotiate_capabilities, SUPPORTED_CAPABILITIES};
pub use config::{Config, ConfigError};
pub use error::{CredsError, Result};
pub use fixture::{FixtureRecord, FixtureStore};
pub use helper::{Command, Helper};
pub use protocol::{read_credentials, write_credentials, CredentialSet};
