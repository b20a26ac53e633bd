use std::path::Path;

use crate::errors::StartupError;

/// One URL per line. Lines are trimmed and blank lines dropped; nothing else
/// is validated, so duplicates and malformed URLs are kept in file order.
pub fn parse_targets(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

pub async fn read_targets(path: &Path) -> Result<Vec<String>, StartupError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StartupError::InputUnreadable {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(parse_targets(&content))
}
