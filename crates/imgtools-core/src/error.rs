//! Error types for the imgtools pipeline engine.
//!
//! Errors are grouped by where they stop propagating: configuration and
//! validation errors reach the entry point before any image is touched,
//! pipeline errors stop at the profile worker that produced them.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::OperationKind;

/// Errors raised while obtaining a usable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration source from disk
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML for a profile root
    #[error("Failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to serialize a profile root back to YAML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// A profile in the root failed validation; the whole root is rejected
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// The per-user profile directory could not be located
    #[error("Cannot determine the home directory for the default profile")]
    NoHomeDir,

    /// Every configuration source failed or none declared a profile
    #[error("No usable profile configuration: {0}")]
    NoProfiles(String),
}

/// Why a single pipeline block was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// The operation tag is not one of the supported kinds
    #[error("unsupported pipeline block type `{0}`")]
    InvalidBlockType(String),

    /// The tag requires a payload that is absent (or empty)
    #[error("{0} block provided but no additional configuration")]
    MissingConfig(OperationKind),

    /// A resize factor that is negative, NaN or infinite
    #[error("resize factor `{0}` must be a finite number greater than zero")]
    InvalidResizeFactor(String),
}

/// A block failure located inside a profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("profile `{profile}`, block #{index}: {source}")]
pub struct ValidationError {
    /// Name of the offending profile
    pub profile: String,
    /// Zero-based position of the offending block
    pub index: usize,
    /// What is wrong with the block
    #[source]
    pub source: BlockError,
}

/// Errors produced while running a profile against one input.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input file does not exist or is not a regular file
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Reading the input failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A resize would produce more pixels than the output budget allows
    #[error("Resize of {path} to {width}x{height} exceeds the {limit} pixel limit")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        limit: u64,
    },

    /// An operation needs pixels but the image has not been decoded
    #[error("{operation} requires a decoded image ({path}); add a decode block first")]
    NotDecoded {
        path: PathBuf,
        operation: &'static str,
    },

    /// The image was decoded but never encoded before writing
    #[error("Cannot write {path}: image was decoded but not encoded")]
    NotEncoded { path: PathBuf },

    /// The requested output format has no encoder
    #[error("Unsupported output format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Encoding failed
    #[error("Encode error for {path} ({format}): {message}")]
    Encode {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// The named ICC profile could not be found or read
    #[error("ICC profile `{name}` not found for {path}")]
    IccProfileNotFound { path: PathBuf, name: String },

    /// The computed output path is the input file itself
    #[error("Refusing to overwrite input {path}; set a name prefix, suffix or format")]
    OverwritesInput { path: PathBuf },

    /// Writing the output file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker running the profile terminated abnormally
    #[error("Worker for profile `{profile}` failed: {message}")]
    Worker { profile: String, message: String },
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
