//! Command line parsing and runtime configuration.
//!
//! The hub takes exactly two positional arguments, the host and port to
//! listen on. Everything else is fixed at its default.

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

/// Bytes read from the socket per request
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Simulated smart-home hub
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Address to listen on
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Top-level configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub port: u16,
    /// Upper bound on bytes taken from the socket in one read
    pub read_chunk_size: usize,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Logging settings. The command line has no switch for these, so the
/// binary always runs at the default level.
#[derive(Debug, Default, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

impl Config {
    pub fn new(listen: impl Into<String>, port: u16) -> Self {
        Self {
            listen: listen.into(),
            port,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            logging: LoggingConfig::default(),
        }
    }

    /// `host:port` as given, for log lines
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config::new(args.host, args.port)
    }
}
