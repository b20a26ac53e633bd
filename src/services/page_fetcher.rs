use std::path::Path;

use chrono::Local;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWrite;

use crate::{
    domain::{
        artifact::{artifact_path, artifact_prefix},
        fetch_outcome::{FetchOutcome, FetchRecord},
    },
    errors::error_chain,
};

use super::AuditLog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// One GET, classified. The response is consumed or dropped before this
/// returns, so its connection is released whatever the outcome.
pub async fn evaluate_target(client: &Client, target: &str) -> FetchOutcome {
    let response = match client.get(target).send().await {
        Ok(res) => res,
        Err(e) => return FetchOutcome::RequestError(error_chain(&e)),
    };

    if response.status() != StatusCode::OK {
        return FetchOutcome::BadStatus(response.status().as_u16());
    }

    match response.bytes().await {
        Ok(body) => FetchOutcome::Success(body.to_vec()),
        Err(e) => FetchOutcome::BodyReadError(error_chain(&e)),
    }
}

/// Fetches `target`, writes its artifact into `output_dir` and appends exactly
/// one audit entry. Never fails: every problem ends up in the record.
pub async fn fetch_and_record<W, C>(
    client: &Client,
    index: usize,
    target: &str,
    output_dir: &Path,
    audit: &mut AuditLog<W, C>,
) -> FetchRecord
where
    W: AsyncWrite + Unpin,
    C: AsyncWrite + Unpin,
{
    let prefix = artifact_prefix(index, target, &Local::now());
    let outcome = evaluate_target(client, target).await;

    let record = FetchRecord {
        target: target.to_string(),
        artifact_path: artifact_path(output_dir, &prefix, outcome.artifact_kind()),
        outcome,
    };

    let write_error = tokio::fs::write(&record.artifact_path, record.outcome.artifact_bytes())
        .await
        .err()
        .map(|e| e.to_string());

    if let Err(e) = audit
        .entry(
            record.level(write_error.as_deref()),
            &record.target,
            &record.log_message(write_error.as_deref()),
        )
        .await
    {
        log::error!("Could not append to audit log for {}: {:?}", record.target, e);
    }

    record
}

/// Processes every target once, in order, one at a time.
pub async fn run_scan<W, C>(
    client: &Client,
    targets: &[String],
    output_dir: &Path,
    audit: &mut AuditLog<W, C>,
) -> ScanSummary
where
    W: AsyncWrite + Unpin,
    C: AsyncWrite + Unpin,
{
    let mut summary = ScanSummary::default();

    for (i, target) in targets.iter().enumerate() {
        let record = fetch_and_record(client, i + 1, target, output_dir, audit).await;

        summary.total += 1;
        match record.outcome.is_success() {
            true => summary.succeeded += 1,
            false => summary.failed += 1,
        }
    }

    summary
}
