use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{
    configuration::Settings,
    domain::target::read_targets,
    errors::StartupError,
    services::{run_scan, AuditLog, ScanSummary, TorTransport},
};

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub log_file: PathBuf,
    pub output_dir: PathBuf,
}

/// Reads the targets, proves the proxy works, then fetches everything.
/// Nothing is written to the output directory or the log file unless the
/// proxy probe succeeded.
pub async fn run(settings: &Settings, targets_file: &Path) -> Result<ScanReport, StartupError> {
    settings.validate()?;

    let targets = read_targets(targets_file).await?;
    log::debug!("Read {} targets from {}", targets.len(), targets_file.display());

    let transport = TorTransport::build(&settings.proxy, &settings.transport).await?;
    log::info!("Transport ready through {}", transport.proxy_address());

    let output_dir = PathBuf::from(&settings.output.directory);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| StartupError::OutputDirectory {
            path: output_dir.display().to_string(),
            source: e,
        })?;

    let log_file = PathBuf::from(&settings.output.log_file);
    let log_error = |e: io::Error| StartupError::LogFile {
        path: log_file.display().to_string(),
        source: e,
    };
    let mut audit = AuditLog::create(&log_file).await.map_err(log_error)?;

    println!("--- Scan started ({} targets) ---", targets.len());
    audit
        .start_run(&Local::now())
        .await
        .map_err(log_error)?;

    let summary = run_scan(transport.client(), &targets, &output_dir, &mut audit).await;

    Ok(ScanReport {
        summary,
        log_file,
        output_dir,
    })
}
