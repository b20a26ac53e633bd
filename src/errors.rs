use std::io;

use thiserror::Error;

/// Failures while building the proxied transport. All of them are fatal.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("SOCKS5 dialer could not be created for '{address}': {reason}")]
    DialerConstruction { address: String, reason: String },

    #[error("SOCKS5 proxy at {address} could not reach {probe}: {source}")]
    ProxyUnreachable {
        address: String,
        probe: String,
        #[source]
        source: io::Error,
    },

    #[error("HTTP client could not be built: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Anything that stops a run before the first target is fetched.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input file could not be read ({path}): {source}")]
    InputUnreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Output directory could not be created ({path}): {source}")]
    OutputDirectory {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Log file could not be written ({path}): {source}")]
    LogFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StartupError {
    /// Transport failures mean the anonymizing network is not usable at all.
    pub fn is_critical(&self) -> bool {
        matches!(self, StartupError::Transport(_))
    }
}

/// Renders an error with every `source()` in its chain, `outer: inner: root`.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }

    message
}
