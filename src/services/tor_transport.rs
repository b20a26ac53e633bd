use std::{io, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue, CONNECTION},
    Client,
};
use socks5_impl::client;
use tokio::{
    io::{AsyncWriteExt, BufStream},
    net::TcpStream,
};
use url::{Host, Url};

use crate::{
    configuration::{ProxySettings, TransportSettings},
    errors::{error_chain, TransportError},
};

/// SOCKS5 endpoint without authentication. Creating one never touches the
/// network; `dial` opens a fresh proxied connection each time.
#[derive(Debug, Clone)]
pub struct Socks5Dialer {
    address: String,
    proxy: reqwest::Proxy,
}

impl Socks5Dialer {
    pub fn new(address: &str) -> Result<Self, TransportError> {
        let construction_error = |reason: String| TransportError::DialerConstruction {
            address: address.to_string(),
            reason,
        };

        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| construction_error("expected host:port".to_string()))?;

        // a bare domain, IPv4 or bracketed IPv6; no scheme, credentials or path
        if host.is_empty() {
            return Err(construction_error("missing host".to_string()));
        }
        if let Err(e) = Host::parse(host) {
            return Err(construction_error(format!("invalid host '{}': {}", host, e)));
        }

        match port.parse::<u16>() {
            Ok(0) => return Err(construction_error("port must not be 0".to_string())),
            Ok(_) => {}
            Err(e) => return Err(construction_error(format!("invalid port '{}': {}", port, e))),
        }

        // socks5h: names, .onion included, are resolved by the proxy
        let proxy_url = Url::parse(&format!("socks5h://{}", address))
            .map_err(|e| construction_error(e.to_string()))?;
        let proxy =
            reqwest::Proxy::all(proxy_url).map_err(|e| construction_error(error_chain(&e)))?;

        Ok(Socks5Dialer {
            address: address.to_string(),
            proxy,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn proxy(&self) -> reqwest::Proxy {
        self.proxy.clone()
    }

    pub async fn dial(&self, host: &str, port: u16) -> io::Result<BufStream<TcpStream>> {
        let stream = TcpStream::connect(self.address.as_str()).await?;
        let mut stream = BufStream::new(stream);

        client::connect(&mut stream, (host, port), None)
            .await
            .map_err(|e| io::Error::other(e.to_string()))?;

        Ok(stream)
    }

    /// Opens one proxied connection to `host:port` and closes it again
    /// without sending anything.
    pub async fn probe(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let probe = format!("{}:{}", host, port);
        log::info!("Probing {} through SOCKS5 proxy {}", probe, self.address);

        let result = match tokio::time::timeout(timeout, self.dial(host, port)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no connection within {}s", timeout.as_secs()),
            )),
        };

        match result {
            Ok(mut stream) => {
                _ = stream.shutdown().await;
                log::info!("Proxy {} reached {}", self.address, probe);
                Ok(())
            }
            Err(e) => Err(TransportError::ProxyUnreachable {
                address: self.address.clone(),
                probe,
                source: e,
            }),
        }
    }
}

/// HTTP client whose every connection goes through a probed SOCKS5 proxy.
#[derive(Debug, Clone)]
pub struct TorTransport {
    client: Client,
    proxy_address: String,
}

impl TorTransport {
    /// Fails without building a client when the proxy cannot reach the probe host.
    pub async fn build(
        proxy: &ProxySettings,
        transport: &TransportSettings,
    ) -> Result<Self, TransportError> {
        let dialer = Socks5Dialer::new(&proxy.address)?;

        dialer
            .probe(&proxy.probe_host, proxy.probe_port, proxy.probe_timeout())
            .await?;

        let client = build_client(&dialer, transport)?;

        Ok(TorTransport {
            client,
            proxy_address: dialer.address().to_string(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn proxy_address(&self) -> &str {
        &self.proxy_address
    }
}

fn build_client(
    dialer: &Socks5Dialer,
    settings: &TransportSettings,
) -> Result<Client, TransportError> {
    log::debug!(
        "Building client via {}: request timeout {:?}, connect/TLS timeout {:?}, expect-continue timeout {:?}, keep-alive {}",
        dialer.address(),
        settings.request_timeout(),
        settings.tls_handshake_timeout(),
        settings.expect_continue_timeout(),
        settings.keep_alive,
    );

    // reqwest bounds connect, SOCKS handshake and TLS together
    let builder = Client::builder()
        .proxy(dialer.proxy())
        .http1_only()
        .timeout(settings.request_timeout())
        .connect_timeout(settings.tls_handshake_timeout())
        .pool_idle_timeout(settings.idle_connection_timeout());

    let builder = match settings.keep_alive {
        true => builder.pool_max_idle_per_host(settings.max_idle_connections),
        false => {
            let mut headers = HeaderMap::new();
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
            builder.pool_max_idle_per_host(0).default_headers(headers)
        }
    };

    Ok(builder.build()?)
}
