use std::path::PathBuf;

use clap::{error::ErrorKind, Parser};

/// Fetch every URL in a list through a SOCKS5 (Tor) proxy and store each page.
#[derive(Parser, Debug, Clone)]
#[command(author, version)]
pub struct Cli {
    /// Text file with one URL per line; blank lines are ignored.
    #[arg(value_name = "TARGETS_FILE")]
    pub targets_file: PathBuf,

    /// Configuration file; defaults to configuration/base.yaml when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses the process arguments. On failure the error (usage included)
    /// has been printed and the returned code is the one to exit with.
    pub fn from_args() -> Result<Self, u8> {
        Self::try_parse_from_iter(std::env::args_os())
    }

    pub fn try_parse_from_iter<I, T>(args: I) -> Result<Self, u8>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(e) => {
                _ = e.print();
                match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Err(0),
                    _ => Err(1),
                }
            }
        }
    }
}
