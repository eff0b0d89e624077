//! imgtools core - declarative image pipelines and the engine that runs them.
//!
//! A configuration document declares named profiles, each an ordered list
//! of pipeline blocks. Every input file is run through every profile:
//!
//! ```text
//! YAML → ProfileRoot → validate → ValidatedProfile
//!                                       │
//!     input file → ExecutionContext ────┤
//!                                       ▼
//!                  Decode → Resize/Crop → Encode → Embed ICC → Write
//! ```
//!
//! Profiles for one file run concurrently; files are processed one after
//! another. A profile stops at its first failing block without affecting
//! its siblings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imgtools_core::{BatchCoordinator, BatchOptions, ProfileRoot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), imgtools_core::ConfigError> {
//!     let root = ProfileRoot::load_from("profiles.yaml".as_ref())?;
//!     let profiles = root.validate().map_err(imgtools_core::ConfigError::from)?;
//!
//!     let coordinator = BatchCoordinator::new(profiles, BatchOptions::default());
//!     let report = coordinator.run(&["./photo.jpg".into()]).await;
//!     println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ops;
pub mod pipeline;

pub use config::{
    DefaultProfileSource, FileSource, ImageProcessingProfile, OperationKind, PipelineBlock,
    ProfileRoot, ProfileSource, Step, ValidatedProfile,
};
pub use error::{BlockError, ConfigError, PipelineError, PipelineResult, ValidationError};
pub use ops::{Operation, WorkingImage};
pub use pipeline::{
    BatchCoordinator, BatchOptions, BatchReport, CancellationToken, ExecutionContext,
    FileDiscovery, WorkerStatus,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
