use std::{path::Path, time::Duration};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::errors::StartupError;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub proxy: ProxySettings,
    pub transport: TransportSettings,
    pub output: OutputSettings,
}

/// Where the SOCKS5 proxy lives and how its health is probed.
#[derive(Deserialize, Clone, Debug)]
pub struct ProxySettings {
    /// `host:port` of the SOCKS5 listener. Tor Browser uses 9150, a system tor 9050.
    pub address: String,
    /// Host reached through the proxy once before any target is fetched.
    pub probe_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub probe_port: u16,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub probe_timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TransportSettings {
    /// Bounds the whole GET: connect, TLS, headers and body.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_idle_connections: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_connection_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub tls_handshake_timeout_secs: u64,
    /// Has no effect: hyper never sends `Expect: 100-continue`.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub expect_continue_timeout_secs: u64,
    /// When false every request dials a fresh connection (and a fresh circuit).
    pub keep_alive: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OutputSettings {
    pub directory: String,
    pub log_file: String,
}

impl ProxySettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn probe_target(&self) -> String {
        format!("{}:{}", self.probe_host, self.probe_port)
    }
}

impl TransportSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn idle_connection_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_connection_timeout_secs)
    }

    pub fn tls_handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_handshake_timeout_secs)
    }

    pub fn expect_continue_timeout(&self) -> Duration {
        Duration::from_secs(self.expect_continue_timeout_secs)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), StartupError> {
        let invalid = |message: &str| Err(StartupError::Configuration(message.to_string()));

        if self.proxy.address.trim().is_empty() {
            return invalid("proxy.address must not be empty");
        }
        if self.proxy.probe_host.trim().is_empty() {
            return invalid("proxy.probe_host must not be empty");
        }
        if self.proxy.probe_port == 0 {
            return invalid("proxy.probe_port must be greater than 0");
        }
        if self.proxy.probe_timeout_secs == 0 {
            return invalid("proxy.probe_timeout_secs must be greater than 0");
        }
        if self.transport.request_timeout_secs == 0 {
            return invalid("transport.request_timeout_secs must be greater than 0");
        }
        if self.transport.tls_handshake_timeout_secs == 0 {
            return invalid("transport.tls_handshake_timeout_secs must be greater than 0");
        }
        if self.output.directory.trim().is_empty() {
            return invalid("output.directory must not be empty");
        }
        if self.output.log_file.trim().is_empty() {
            return invalid("output.log_file must not be empty");
        }

        Ok(())
    }
}

/// Layers, lowest precedence first: built-in defaults, the configuration file
/// (`path` when given, which must then exist, otherwise
/// `configuration/base.{yaml,toml,json}` in the working directory when
/// present), `APP_` environment variables
/// such as `APP_PROXY__ADDRESS=127.0.0.1:9050`.
pub fn get_configuration_from(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => {
            let base_path = std::env::current_dir()
                .map_err(|e| config::ConfigError::Message(e.to_string()))?;
            config::File::from(base_path.join("configuration").join("base")).required(false)
        }
    };

    let settings = config::Config::builder()
        .set_default("proxy.address", "127.0.0.1:9150")?
        .set_default("proxy.probe_host", "check.torproject.org")?
        .set_default("proxy.probe_port", 80_i64)?
        .set_default("proxy.probe_timeout_secs", 30_i64)?
        .set_default("transport.request_timeout_secs", 30_i64)?
        .set_default("transport.max_idle_connections", 10_i64)?
        .set_default("transport.idle_connection_timeout_secs", 30_i64)?
        .set_default("transport.tls_handshake_timeout_secs", 10_i64)?
        .set_default("transport.expect_continue_timeout_secs", 1_i64)?
        .set_default("transport.keep_alive", false)?
        .set_default("output.directory", "output")?
        .set_default("output.log_file", "scan_report.log")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
