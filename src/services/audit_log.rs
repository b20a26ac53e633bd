use std::{io, path::Path};

use chrono::{DateTime, Local};
use log::Level;
use tokio::{
    fs::File,
    io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout},
};

/// Append-only record of one run. Every entry is written to the sink and
/// then echoed verbatim to the console, so both show the same lines in the
/// same order whatever the logger's filter is.
pub struct AuditLog<W, C> {
    sink: W,
    console: C,
}

impl AuditLog<BufWriter<File>, Stdout> {
    /// Truncates an existing file.
    pub async fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path).await?;
        Ok(AuditLog::new(BufWriter::new(file), tokio::io::stdout()))
    }
}

impl<W, C> AuditLog<W, C>
where
    W: AsyncWrite + Unpin,
    C: AsyncWrite + Unpin,
{
    pub fn new(sink: W, console: C) -> Self {
        AuditLog { sink, console }
    }

    pub async fn start_run(&mut self, started_at: &DateTime<Local>) -> io::Result<()> {
        let line = format!("Scan started: {}\n", started_at.to_rfc3339());
        self.sink.write_all(line.as_bytes()).await?;
        self.sink.flush().await
    }

    pub async fn entry(&mut self, level: Level, target: &str, message: &str) -> io::Result<()> {
        let line = format!("[{}] Scanning: {} -> {}\n", level, target, message);

        self.sink.write_all(line.as_bytes()).await?;
        self.sink.flush().await?;

        if let Err(e) = self.echo(&line).await {
            log::warn!("Could not echo audit entry to console: {:?}", e);
        }

        Ok(())
    }

    async fn echo(&mut self, line: &str) -> io::Result<()> {
        self.console.write_all(line.as_bytes()).await?;
        self.console.flush().await
    }

    pub fn into_parts(self) -> (W, C) {
        (self.sink, self.console)
    }
}
