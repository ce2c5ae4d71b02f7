use std::io::{self, BufRead, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use crate::args::ServerConfig;
use crate::file_serving::handlers::handle_request;
use crate::http::{read_request, write_response, Incoming, Method, Response};
use crate::logging::LoggingExt;
use crate::{log_error, log_request, log_response, shutdown};

/// How often an idle keep-alive connection re-checks the shutdown flag.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How often the idle listener re-checks for connections and shutdown.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(500);

pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind((config.bind.as_str(), config.port))?;
        Ok(Self { listener, config })
    }

    /// Address the OS actually bound, with the real port when 0 was asked.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serves connections one at a time until a shutdown is requested.
    /// The listener is polled so the flag is seen while idle.
    pub fn serve(&self) -> io::Result<()> {
        self.listener.set_nonblocking(true)?;

        while !shutdown::requested() {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    if let Err(e) = handle_connection(stream, &self.config) {
                        log_error!(e, "Error handling connection");
                    }
                }
                Err(e) => {
                    if !is_idle(&e) {
                        log_error!(e, "Failed to accept connection");
                    }
                    thread::sleep(accept_delay(&e));
                }
            }
        }

        log::info!("Shutting down");
        Ok(())
    }
}

fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Pause before the next `accept` after it failed with `err`.
fn accept_delay(err: &io::Error) -> Duration {
    match err.kind() {
        io::ErrorKind::WouldBlock => ACCEPT_POLL_INTERVAL,
        io::ErrorKind::Interrupted => Duration::ZERO,
        // EMFILE and friends persist; don't spin on them
        _ => ACCEPT_ERROR_BACKOFF,
    }
}

pub fn start_server(config: ServerConfig) -> io::Result<()> {
    let server = Server::bind(config)?;
    let addr = server.local_addr()?;
    // Installed before the banner so a launcher that waits for it can interrupt
    shutdown::install()?;
    println!(
        "Serving directory {} at http://{}:{}",
        server.config().root.display(),
        addr.ip(),
        addr.port()
    );

    server.serve()
    // listener closes when `server` drops
}

fn handle_connection(stream: TcpStream, config: &ServerConfig) -> io::Result<()> {
    // Accepted sockets may inherit the listener's non-blocking mode
    stream.set_nonblocking(false)?;
    let peer = stream.peer_addr()?;
    log::debug!("New connection from {}", peer);

    let mut reader = BufReader::new(&stream);
    loop {
        if !wait_for_request(&stream, &mut reader)? {
            break;
        }

        let start_time = Instant::now();
        match read_request(&mut reader)? {
            Incoming::Closed => break,
            Incoming::Malformed(err) => {
                log::warn!("Malformed request from {}: {:?}", peer, err);
                let response = err.into_response().finalize();
                send(&stream, &response, false, start_time)?;
                break;
            }
            Incoming::Request(request) => {
                log_request!(&request.request_line);
                let response = handle_request(config, &request);
                let head_only = request.method == Method::Head;
                peer.log_operation("write_response", || {
                    send(&stream, &response, head_only, start_time)
                })?;
                if response.close || !request.keep_alive() {
                    break;
                }
            }
        }
    }

    log::debug!("Closing connection from {}", peer);
    Ok(())
}

fn send(stream: &TcpStream, response: &Response, head_only: bool, start_time: Instant) -> io::Result<()> {
    let mut writer = stream;
    write_response(&mut writer, response, head_only)?;
    log_response!(
        response.status.as_u16(),
        start_time.elapsed(),
        response.body.len()
    );
    Ok(())
}

/// Blocks until the next request starts arriving. Returns `false` when the
/// peer hung up or a shutdown was requested while idle.
fn wait_for_request(stream: &TcpStream, reader: &mut BufReader<&TcpStream>) -> io::Result<bool> {
    if !reader.buffer().is_empty() {
        return Ok(true);
    }

    stream.set_read_timeout(Some(IDLE_POLL_INTERVAL))?;
    let ready = loop {
        match reader.fill_buf() {
            Ok(buf) => break Ok(!buf.is_empty()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                if shutdown::requested() {
                    break Ok(false);
                }
            }
            Err(e) => break Err(e),
        }
    };
    stream.set_read_timeout(None)?;
    ready
}
