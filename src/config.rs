//! Application configuration management.
//!
//! Configuration comes entirely from CLI flags, each of which can also be set
//! through a `FILEDROP_*` environment variable (flags win over the environment).
//! The parsed [`Args`] are converted into an immutable [`Config`] that is shared
//! with every handler through [`crate::AppState`] — there is no ambient global
//! configuration.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use filedrop::config::{Args, Config};
//!
//! let args = Args::parse();
//! let config = Config::from(args);
//!
//! println!("Server will bind to {}", config.bind_address());
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Default upload size limit: 10 MiB, matching common reverse-proxy defaults.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// CLI arguments for the file server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address the server listens on
    #[arg(long, env = "FILEDROP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the server listens on
    #[arg(long, env = "FILEDROP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory served files are read from and uploads are stored in.
    /// Created at startup if missing.
    #[arg(long, env = "FILEDROP_STORAGE_DIR", default_value = "./files")]
    pub storage_dir: PathBuf,

    /// Maximum upload request body size in bytes
    #[arg(long, env = "FILEDROP_MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)]
    pub max_upload_size: u64,
}

/// Main application configuration.
///
/// Set once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address to bind the HTTP listener to.
    pub host: String,
    /// Port to bind the HTTP listener to.
    pub port: u16,
    /// Storage root: all served and uploaded files live under this directory.
    pub storage_dir: PathBuf,
    /// Upper bound on upload request bodies, in bytes.
    pub max_upload_size: u64,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            storage_dir: args.storage_dir,
            max_upload_size: args.max_upload_size,
        }
    }
}

impl Config {
    /// The `host:port` address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
