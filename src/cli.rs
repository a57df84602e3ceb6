//! Command-line interface for inspecting a cache directory
//!
//! This module handles parsing of CLI arguments using clap, resolving which
//! directory to operate on, and running the selected subcommand against a
//! `FileCache`.

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Duration;
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::cache::{CacheError, FileCache, JsonSource};

/// Error types for CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Both an explicit directory and a project name were given
    #[error("--dir and --project cannot be used together")]
    ConflictingLocation,

    /// The platform cache directory could not be determined
    #[error("Could not determine a cache directory for project '{0}'")]
    NoProjectDir(String),

    /// JSON text could not be parsed or printed
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON given to `put` was valid but not an object
    #[error("Cached values must be JSON objects")]
    NotAnObject,

    /// Nothing usable is cached under the identifier
    #[error("No usable cache entry for id '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// jsoncache - Inspect and edit a directory of cached JSON objects
#[derive(Parser, Debug)]
#[command(name = "jsoncache")]
#[command(about = "Inspect and edit a directory of cached JSON objects")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Cache directory (defaults to ./cache)
    #[arg(long, global = true, env = "JSONCACHE_DIR", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Use the platform cache directory of the named application
    #[arg(long, global = true, value_name = "NAME")]
    pub project: Option<String>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cached file names
    List,

    /// Print the file path used for an identifier
    Path {
        /// Cache identifier
        id: String,
    },

    /// Print a cached object
    Show {
        /// Cache identifier
        id: String,

        /// Ignore the entry if it is this many seconds old or older
        #[arg(long, value_name = "SECS")]
        max_age: Option<u32>,
    },

    /// Print when an entry was written and whether it is still fresh
    Info {
        /// Cache identifier
        id: String,

        /// Freshness window in seconds
        #[arg(long, value_name = "SECS")]
        max_age: Option<u32>,
    },

    /// Store a JSON object under an identifier
    Put {
        /// Cache identifier
        id: String,

        /// JSON object text, e.g. '{"test": 1}'
        json: String,
    },

    /// Remove an entry
    Delete {
        /// Cache identifier
        id: String,
    },
}

/// Where the cache directory comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// `<cwd>/cache`
    WorkingDir,
    /// An explicit directory
    Dir(PathBuf),
    /// The platform cache directory of an application
    Project(String),
}

impl CacheLocation {
    /// Resolves the cache location from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(CacheLocation)` for at most one of `--dir` / `--project`
    /// * `Err(CliError::ConflictingLocation)` if both were given
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        match (&cli.dir, &cli.project) {
            (None, None) => Ok(CacheLocation::WorkingDir),
            (Some(dir), None) => Ok(CacheLocation::Dir(dir.clone())),
            (None, Some(name)) => Ok(CacheLocation::Project(name.clone())),
            (Some(_), Some(_)) => Err(CliError::ConflictingLocation),
        }
    }

    /// Builds the cache for this location
    pub fn open(&self) -> Result<FileCache, CliError> {
        match self {
            CacheLocation::WorkingDir => Ok(FileCache::default()),
            CacheLocation::Dir(dir) => Ok(FileCache::with_dir(dir.clone())),
            CacheLocation::Project(name) => {
                FileCache::for_project(name).ok_or_else(|| CliError::NoProjectDir(name.clone()))
            }
        }
    }
}

/// Parses JSON text that must describe an object.
pub fn parse_object_arg(s: &str) -> Result<JsonSource, CliError> {
    match serde_json::from_str::<Value>(s)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::NotAnObject),
    }
}

fn max_age(secs: Option<u32>) -> Option<Duration> {
    secs.map(|secs| Duration::seconds(i64::from(secs)))
}

/// Runs the parsed command, writing its output to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    let cache = CacheLocation::from_cli(cli)?.open()?;
    info!("Using cache directory {}", cache.root().display());

    match &cli.command {
        Commands::List => {
            for name in cache.list_cached_files()? {
                writeln!(out, "{}", name)?;
            }
        }
        Commands::Path { id } => {
            writeln!(out, "{}", cache.cache_path(id).display())?;
        }
        Commands::Show { id, max_age: secs } => {
            let object: JsonSource = cache
                .load(id, max_age(*secs))
                .ok_or_else(|| CliError::NotFound(id.clone()))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&object)?)?;
        }
        Commands::Info { id, max_age: secs } => {
            let modified = cache
                .modification_date(id)
                .ok_or_else(|| CliError::NotFound(id.clone()))?;
            writeln!(out, "path: {}", cache.cache_path(id).display())?;
            writeln!(out, "modified: {}", modified.to_rfc3339())?;
            if let Some(validity) = max_age(*secs) {
                writeln!(out, "valid: {}", cache.is_cache_valid(id, validity))?;
            }
        }
        Commands::Put { id, json } => {
            let object = parse_object_arg(json)?;
            cache.save(&object, id)?;
            info!("Saved {}", cache.cache_path(id).display());
        }
        Commands::Delete { id } => match cache.delete(id) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CliError::NotFound(id.clone()));
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}
