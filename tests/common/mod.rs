#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use gzcors::args::ServerConfig;
use gzcors::server::Server;

pub use gzcors::test_support::TempRoot;

/// Binds on an ephemeral loopback port and serves from a background thread.
pub fn spawn_server(root: &TempRoot) -> SocketAddr {
    let config = ServerConfig::new("127.0.0.1", 0, root.path()).unwrap();
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.serve());
    addr
}

#[derive(Debug)]
pub struct RawResponse {
    pub status_line: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    stream
}

/// Reads one response. The body is read only when `expect_body` is set.
pub fn read_response<R: BufRead>(reader: &mut R, expect_body: bool) -> RawResponse {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).unwrap();
    let status_line = status_line.trim_end().to_string();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("bad status line: {:?}", status_line));

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (key, value) = line.split_once(':').unwrap();
        headers.push((key.trim().to_string(), value.trim().to_string()));
    }

    let mut response = RawResponse {
        status_line,
        status,
        headers,
        body: Vec::new(),
    };
    if expect_body {
        let length: usize = response
            .header("Content-Length")
            .map(|v| v.parse().unwrap())
            .unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();
        response.body = body;
    }
    response
}

/// Sends one request on a fresh connection and reads the answer.
pub fn request(addr: SocketAddr, method: &str, target: &str, extra_headers: &[(&str, &str)]) -> RawResponse {
    let mut stream = connect(addr);
    let mut raw = format!("{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n", method, target, addr);
    for (k, v) in extra_headers {
        raw.push_str(&format!("{}: {}\r\n", k, v));
    }
    raw.push_str("\r\n");
    stream.write_all(raw.as_bytes()).unwrap();

    let mut reader = BufReader::new(stream);
    read_response(&mut reader, method != "HEAD")
}

pub fn get(addr: SocketAddr, target: &str) -> RawResponse {
    request(addr, "GET", target, &[])
}
