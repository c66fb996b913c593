use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::http::mime::MimeTypes;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("root directory {} is not usable: {source}", path.display())]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("root {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),
}

/// How accepted connections are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One spawned task per connection
    #[default]
    #[serde(alias = "forking")]
    #[value(alias = "forking")]
    Task,
    /// Connections handled one after another on the accept loop
    Single,
}

/// Command-line flags. Every flag overrides the file and environment.
#[derive(Debug, Default, Parser)]
#[command(name = "spindle", about = "Serve a directory over HTTP/1.0")]
pub struct Args {
    /// YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Concurrency mode
    #[arg(short = 'c', long, value_enum)]
    pub mode: Option<Mode>,
    /// Path to the mime.types table
    #[arg(short = 'm', long)]
    pub mime_types: Option<PathBuf>,
    /// Type used when no extension matches
    #[arg(short = 'M', long)]
    pub default_mime: Option<String>,
    /// Address to bind
    #[arg(short = 'a', long)]
    pub address: Option<String>,
    /// Port to listen on
    #[arg(short = 'p', long)]
    pub port: Option<u16>,
    /// Directory to serve
    #[arg(short = 'r', long)]
    pub root: Option<PathBuf>,
}

/// Raw configuration as read from defaults, file, environment and flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub address: String,
    pub port: u16,
    pub root: PathBuf,
    pub mime_types: PathBuf,
    pub default_mime: String,
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 9898,
            root: PathBuf::from("www"),
            mime_types: PathBuf::from("/etc/mime.types"),
            default_mime: "text/plain".to_string(),
            mode: Mode::Task,
        }
    }
}

impl Config {
    /// Builds the configuration for a process started with `args`.
    ///
    /// Precedence, lowest first: defaults, `--config` file, `SPINDLE_*`
    /// environment variables, flags.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base
            .with_env(|name| std::env::var(name).ok())?
            .with_args(args))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Applies `SPINDLE_*` overrides using `lookup` to read variables.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SPINDLE_ADDRESS") {
            self.address = v;
        }
        if let Some(v) = lookup("SPINDLE_PORT") {
            self.port = v.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "SPINDLE_PORT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("SPINDLE_ROOT") {
            self.root = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPINDLE_MIME_TYPES") {
            self.mime_types = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPINDLE_DEFAULT_MIME") {
            self.default_mime = v;
        }
        if let Some(v) = lookup("SPINDLE_MODE") {
            self.mode = Mode::from_str(&v, true).map_err(|_| ConfigError::InvalidEnv {
                name: "SPINDLE_MODE",
                value: v.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(v) = &args.address {
            self.address = v.clone();
        }
        if let Some(v) = args.port {
            self.port = v;
        }
        if let Some(v) = &args.root {
            self.root = v.clone();
        }
        if let Some(v) = &args.mime_types {
            self.mime_types = v.clone();
        }
        if let Some(v) = &args.default_mime {
            self.default_mime = v.clone();
        }
        if let Some(v) = args.mode {
            self.mode = v;
        }
        self
    }

    /// Validates the root and loads the MIME table.
    ///
    /// A missing or unreadable MIME table is not fatal: every file is then
    /// served with the default type.
    pub fn into_server(self) -> Result<ServerConfig, ConfigError> {
        let root = std::fs::canonicalize(&self.root).map_err(|source| ConfigError::Root {
            path: self.root.clone(),
            source,
        })?;
        if !root.is_dir() {
            return Err(ConfigError::RootNotDirectory(root));
        }

        let mime_types = match MimeTypes::load(&self.mime_types) {
            Ok(table) => table,
            Err(e) => {
                warn!(
                    path = %self.mime_types.display(),
                    error = %e,
                    "Could not load MIME table, using default type for all files"
                );
                MimeTypes::default()
            }
        };

        Ok(ServerConfig {
            address: self.address,
            port: self.port,
            root,
            mime_types,
            default_mime: self.default_mime,
            mode: self.mode,
        })
    }
}

/// Validated, immutable settings shared by every connection.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Canonical served root
    pub root: PathBuf,
    pub mime_types: MimeTypes,
    pub default_mime: String,
    pub mode: Mode,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Content type for `path`, falling back to the default type.
    pub fn mime_type_for(&self, path: &Path) -> &str {
        self.mime_types
            .for_path(path)
            .unwrap_or(self.default_mime.as_str())
    }
}
