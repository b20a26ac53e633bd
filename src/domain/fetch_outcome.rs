use std::{borrow::Cow, path::PathBuf};

use log::Level;

use super::artifact::ArtifactKind;

pub const BODY_READ_DIAGNOSTIC: &str = "Response body could not be read";

/// Result of one GET, in classification priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    RequestError(String),
    BadStatus(u16),
    BodyReadError(String),
    Success(Vec<u8>),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn artifact_kind(&self) -> ArtifactKind {
        match self {
            FetchOutcome::Success(_) => ArtifactKind::Page,
            _ => ArtifactKind::Failed,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            FetchOutcome::Success(_) => Level::Info,
            _ => Level::Error,
        }
    }

    /// Bytes written to the artifact file. Pages are stored verbatim.
    pub fn artifact_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            FetchOutcome::RequestError(e) => Cow::Borrowed(e.as_bytes()),
            FetchOutcome::BadStatus(code) => {
                Cow::Owned(format!("HTTP STATUS: {}", code).into_bytes())
            }
            FetchOutcome::BodyReadError(_) => Cow::Borrowed(BODY_READ_DIAGNOSTIC.as_bytes()),
            FetchOutcome::Success(body) => Cow::Borrowed(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchRecord {
    pub target: String,
    pub artifact_path: PathBuf,
    pub outcome: FetchOutcome,
}

impl FetchRecord {
    /// The audit message for this attempt. `write_error` is set when the
    /// artifact itself could not be stored.
    pub fn log_message(&self, write_error: Option<&str>) -> String {
        let path = self.artifact_path.display();

        let message = match &self.outcome {
            FetchOutcome::RequestError(_) => format!("FAILED (saved: {})", path),
            FetchOutcome::BadStatus(code) => format!("FAILED (HTTP {}, saved: {})", code, path),
            FetchOutcome::BodyReadError(e) => {
                format!("FAILED (body could not be read: {}, saved: {})", e, path)
            }
            FetchOutcome::Success(body) => {
                format!("SUCCESS ({} bytes, saved: {})", body.len(), path)
            }
        };

        match write_error {
            Some(e) => format!("{} [artifact not written: {}]", message, e),
            None => message,
        }
    }

    pub fn level(&self, write_error: Option<&str>) -> Level {
        match write_error {
            Some(_) => Level::Error,
            None => self.outcome.level(),
        }
    }
}
