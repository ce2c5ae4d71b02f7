mod common;

use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use gzcors::args::ServerConfig;
use gzcors::server::Server;
use gzcors::shutdown;

use common::TempRoot;

const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Starts the binary and returns it with the first stdout line.
fn launch_in(args: &[&str], cwd: &Path) -> (Child, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gzcors"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut banner = String::new();
    BufReader::new(stdout).read_line(&mut banner).unwrap();
    (child, banner.trim_end().to_string())
}

fn wait_with_timeout(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + EXIT_TIMEOUT;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            let _ = child.wait();
            panic!("server still running {:?} after the signal", EXIT_TIMEOUT);
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn banner_port(banner: &str, prefix: &str) -> u16 {
    banner
        .strip_prefix(prefix)
        .unwrap_or_else(|| panic!("unexpected banner: {:?}", banner))
        .parse()
        .unwrap()
}

#[cfg(unix)]
fn send_signal(child: &Child, signal: libc::c_int) {
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, signal) };
    assert_eq!(rc, 0);
}

#[cfg(unix)]
#[test]
fn test_banner_reports_assigned_port_and_sigint_exits_cleanly() {
    let root = TempRoot::new();
    let dir = root.path().to_str().unwrap();
    let (mut child, banner) = launch_in(
        &["--bind", "0.0.0.0", "--port", "0", "--directory", dir],
        root.path(),
    );

    let prefix = format!("Serving directory {} at http://0.0.0.0:", root.path().display());
    assert_ne!(banner_port(&banner, &prefix), 0);

    // No client ever connects
    send_signal(&child, libc::SIGINT);
    let status = wait_with_timeout(&mut child);
    assert!(status.success(), "exit status: {:?}", status);
    assert_eq!(status.code(), Some(0));
}

#[cfg(unix)]
#[test]
fn test_sigterm_exits_cleanly_and_closes_listener() {
    let root = TempRoot::new();
    let dir = root.path().to_str().unwrap();
    let (mut child, banner) = launch_in(&["-a", "127.0.0.1", "-p", "0", "-d", dir], root.path());

    let prefix = format!("Serving directory {} at http://127.0.0.1:", root.path().display());
    let port = banner_port(&banner, &prefix);
    assert_ne!(port, 0);

    send_signal(&child, libc::SIGTERM);
    assert_eq!(wait_with_timeout(&mut child).code(), Some(0));
    assert!(TcpStream::connect(("127.0.0.1", port)).is_err());
}

#[test]
fn test_relative_directory_is_reported_absolute() {
    let root = TempRoot::new();
    root.write("data/.keep", b"");
    let (mut child, banner) = launch_in(&["-p", "0", "-d", "data"], root.path());
    let _ = child.kill();
    let _ = child.wait();

    let prefix = format!(
        "Serving directory {} at http://127.0.0.1:",
        root.path().join("data").display()
    );
    assert_ne!(banner_port(&banner, &prefix), 0);
}

#[test]
fn test_missing_directory_fails_startup() {
    let root = TempRoot::new();
    let missing = root.path().join("absent");
    let status = Command::new(env!("CARGO_BIN_EXE_gzcors"))
        .args(["-p", "0", "-d", missing.to_str().unwrap()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn test_port_zero_reports_assigned_port() {
    let root = TempRoot::new();
    let config = ServerConfig::new("0.0.0.0", 0, root.path()).unwrap();
    let server = Server::bind(config).unwrap();

    let addr = server.local_addr().unwrap();
    assert_ne!(addr.port(), 0);
    assert!(addr.ip().is_unspecified());
}

#[test]
fn test_bind_failure_is_an_error() {
    let root = TempRoot::new();
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let config = ServerConfig::new("127.0.0.1", port, root.path()).unwrap();
    assert!(Server::bind(config).is_err());
}

#[test]
fn test_idle_serve_returns_after_shutdown_request() {
    let root = TempRoot::new();
    let config = ServerConfig::new("127.0.0.1", 0, root.path()).unwrap();
    let server = Server::bind(config).unwrap();
    let handle = thread::spawn(move || server.serve());

    thread::sleep(Duration::from_millis(100));
    shutdown::request();

    let deadline = Instant::now() + EXIT_TIMEOUT;
    while !handle.is_finished() {
        assert!(Instant::now() < deadline, "serve did not return while idle");
        thread::sleep(Duration::from_millis(20));
    }
    assert!(handle.join().unwrap().is_ok());
}
