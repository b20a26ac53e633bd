use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use url::Url;

const UNKNOWN_HOST: &str = "unknown";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Page,
    Failed,
}

impl ArtifactKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Page => ".html",
            ArtifactKind::Failed => "_FAILED.txt",
        }
    }
}

/// File-name safe host of a target: dots become underscores and an explicit
/// port is appended. Targets that do not parse, or have no host, map to
/// `unknown` so the attempt is still recorded.
pub fn host_segment(target: &str) -> String {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => return UNKNOWN_HOST.to_string(),
    };

    let host = match url.host_str() {
        Some("") | None => return UNKNOWN_HOST.to_string(),
        Some(host) => host,
    };

    let mut segment: String = host
        .chars()
        .map(|c| match c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            true => c,
            false => '_',
        })
        .collect();

    if let Some(port) = url.port() {
        segment.push_str(&format!("_{}", port));
    }

    segment
}

/// `<NN>_<host>_<YYYYmmdd_HHMMSS>`. The index is 1-based and zero-padded to
/// two digits so that file names sort in processing order.
pub fn artifact_prefix<Tz: TimeZone>(
    index: usize,
    target: &str,
    fetched_at: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{:02}_{}_{}",
        index,
        host_segment(target),
        fetched_at.format(TIMESTAMP_FORMAT)
    )
}

pub fn artifact_path(output_dir: &Path, prefix: &str, kind: ArtifactKind) -> PathBuf {
    output_dir.join(format!("{}{}", prefix, kind.suffix()))
}
