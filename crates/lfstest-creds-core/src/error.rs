//! Error types for the credential helper.
//!
//! Every variant is terminal: the helper prints the message to its
//! diagnostic stream and exits non-zero without writing any protocol output.
//! The `Display` text of each variant, followed by its source chain, is what
//! the calling test suite sees on stderr, so the wording is kept stable.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while serving a helper invocation.
#[derive(Debug, Error)]
pub enum CredsError {
    /// The helper was not invoked with exactly one argument.
    ///
    /// The count includes the program name.
    #[error("wrong number of args: {0}")]
    Usage(usize),

    /// The single argument is not a known helper command.
    #[error("bad cmd: {0}")]
    UnknownCommand(String),

    /// An input line did not contain a `=` separator.
    #[error("bad line: {0}")]
    BadLine(String),

    /// Standard input could not be read.
    #[error("reading standard input")]
    Stdin(#[source] std::io::Error),

    /// A fixture file could not be opened or was not valid UTF-8.
    #[error("Error opening {path:?}")]
    FixtureOpen {
        /// The fixture file that was tried.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixture file did not hold exactly `authtype:username:credential`.
    #[error("Invalid data {content:?} while reading {path:?}")]
    FixtureData {
        /// The fixture file that was read.
        path: PathBuf,
        /// The raw file content.
        content: String,
    },

    /// `wwwauth[]` validation is `required` but no `Basic ` challenge was sent.
    #[error("Missing required 'wwwauth[]' key in credentials")]
    WwwAuthMissing,

    /// `wwwauth[]` validation is `forbidden` but a challenge was sent.
    #[error("Unexpected 'wwwauth[]' key in credentials")]
    WwwAuthUnexpected,

    /// Writing the response or the transcript failed.
    #[error("writing output")]
    Output(#[source] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = CredsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_messages_match_helper_wording() {
        assert_eq!(CredsError::Usage(3).to_string(), "wrong number of args: 3");
        assert_eq!(
            CredsError::UnknownCommand("approve".to_string()).to_string(),
            "bad cmd: approve"
        );
        assert_eq!(
            CredsError::BadLine("nonsense".to_string()).to_string(),
            "bad line: nonsense"
        );
    }

    #[test]
    fn fixture_data_error_quotes_path_and_content() {
        let err = CredsError::FixtureData {
            path: PathBuf::from("/tmp/creds/example.com"),
            content: "basic:alice\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"Invalid data "basic:alice\n" while reading "/tmp/creds/example.com""#
        );
    }

    #[test]
    fn fixture_open_error_keeps_io_source() {
        use std::error::Error as _;

        let err = CredsError::FixtureOpen {
            path: PathBuf::from("/tmp/creds/example.com"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), r#"Error opening "/tmp/creds/example.com""#);
        assert_eq!(err.source().unwrap().to_string(), "not found");
    }

    #[test]
    fn wwwauth_errors_name_the_key() {
        assert!(CredsError::WwwAuthMissing.to_string().contains("'wwwauth[]'"));
        assert!(CredsError::WwwAuthUnexpected
            .to_string()
            .contains("'wwwauth[]'"));
    }
}
