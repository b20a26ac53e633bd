//! In-process fixtures: a canned HTTP server and a SOCKS5 proxy on 127.0.0.1.
#![allow(dead_code)]

use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use torfetch::configuration::{OutputSettings, ProxySettings, Settings, TransportSettings};

pub const PAGE_BODY: &[u8] = b"hello";

fn respond(path: &str) -> Vec<u8> {
    match path {
        "/ok" | "/ok-again" => {
            let mut response =
                b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 5\r\nConnection: close\r\n\r\n"
                    .to_vec();
            response.extend_from_slice(PAGE_BODY);
            response
        }
        "/truncated" => {
            b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial".to_vec()
        }
        "/error" => {
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_vec()
        }
        _ => b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found"
            .to_vec(),
    }
}

/// Serves `/ok`, `/ok-again`, `/truncated`, `/error`; everything else is 404.
pub async fn spawn_http_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_http(stream));
        }
    });

    addr
}

async fn serve_http(mut stream: TcpStream) -> io::Result<()> {
    let mut buf = [0u8; 4096];
    let mut request = Vec::new();

    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&request);
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    stream.write_all(&respond(&path)).await?;
    stream.shutdown().await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksMode {
    /// Connects to the requested destination and relays bytes both ways.
    Relay,
    /// Completes the greeting but answers every CONNECT with "connection refused".
    RefuseConnect,
    /// Accepts the TCP connection and never sends a byte.
    Stall,
}

pub async fn spawn_socks5_proxy(mode: SocksMode) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_socks5(stream, mode));
        }
    });

    addr
}

async fn serve_socks5(mut client: TcpStream, mode: SocksMode) -> io::Result<()> {
    if mode == SocksMode::Stall {
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(client);
        return Ok(());
    }

    // VER NMETHODS METHODS...
    let mut greeting = [0u8; 2];
    client.read_exact(&mut greeting).await?;
    let mut methods = vec![0u8; greeting[1] as usize];
    client.read_exact(&mut methods).await?;
    client.write_all(&[0x05, 0x00]).await?;

    // VER CMD RSV ATYP
    let mut request = [0u8; 4];
    client.read_exact(&mut request).await?;
    let host = match request[3] {
        0x01 => {
            let mut ip = [0u8; 4];
            client.read_exact(&mut ip).await?;
            Ipv4Addr::from(ip).to_string()
        }
        0x03 => {
            let mut len = [0u8; 1];
            client.read_exact(&mut len).await?;
            let mut name = vec![0u8; len[0] as usize];
            client.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).to_string()
        }
        0x04 => {
            let mut ip = [0u8; 16];
            client.read_exact(&mut ip).await?;
            Ipv6Addr::from(ip).to_string()
        }
        _ => return Ok(()),
    };
    let mut port = [0u8; 2];
    client.read_exact(&mut port).await?;
    let port = u16::from_be_bytes(port);

    let upstream = match mode {
        SocksMode::Relay => TcpStream::connect((host.as_str(), port)).await.ok(),
        SocksMode::RefuseConnect | SocksMode::Stall => None,
    };

    match upstream {
        Some(mut upstream) => {
            client
                .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
                .await?;
            tokio::io::copy_bidirectional(&mut client, &mut upstream).await?;
        }
        None => {
            client
                .write_all(&[0x05, 0x05, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
                .await?;
        }
    }

    Ok(())
}

/// An address nothing is listening on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn settings_for(proxy: SocketAddr, probe: SocketAddr, dir: &Path) -> Settings {
    Settings {
        proxy: ProxySettings {
            address: proxy.to_string(),
            probe_host: probe.ip().to_string(),
            probe_port: probe.port(),
            probe_timeout_secs: 5,
        },
        transport: TransportSettings {
            request_timeout_secs: 5,
            max_idle_connections: 10,
            idle_connection_timeout_secs: 30,
            tls_handshake_timeout_secs: 5,
            expect_continue_timeout_secs: 1,
            keep_alive: false,
        },
        output: OutputSettings {
            directory: dir.join("output").display().to_string(),
            log_file: dir.join("scan_report.log").display().to_string(),
        },
    }
}

pub fn write_targets(dir: &Path, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join("targets.txt");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}
