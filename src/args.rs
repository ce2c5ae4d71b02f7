use clap::Parser;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::logging::LoggingExt;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TCP port to listen on
    #[arg(short, long, default_value = "9000")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'a', long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Directory to serve
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,
}

/// Settings fixed at startup. The root is absolute and every request path
/// is resolved by joining onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub root: PathBuf,
}

impl ServerConfig {
    pub fn new(bind: impl Into<String>, port: u16, directory: &Path) -> io::Result<Self> {
        let root = directory.log_operation("canonicalize", || fs::canonicalize(directory))?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }

        Ok(Self {
            bind: bind.into(),
            port,
            root,
        })
    }
}

impl Args {
    pub fn into_config(self) -> io::Result<ServerConfig> {
        ServerConfig::new(self.bind, self.port, &self.directory)
    }
}
