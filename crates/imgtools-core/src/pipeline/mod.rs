//! Pipeline construction and concurrent execution.
//!
//! - **context**: per-input binding and output naming
//! - **translate**: validated steps to operations
//! - **executor**: short-circuiting chain execution
//! - **worker**: one profile on one input, cancellable at entry
//! - **coordinator**: every profile on every input, file by file
//! - **discovery**: directory inputs to image files
//! - **cancel**: the shared cancellation signal

pub mod cancel;
pub mod context;
pub mod coordinator;
pub mod discovery;
pub mod executor;
pub mod translate;
pub mod worker;

pub use cancel::CancellationToken;
pub use context::{output_file_name, ExecutionContext};
pub use coordinator::{BatchCoordinator, BatchOptions, BatchReport, FileReport};
pub use discovery::FileDiscovery;
pub use executor::{execute, run_chain};
pub use translate::translate;
pub use worker::{
    run_worker, ImagePipelineRunner, ProfileJob, ProfileOutcome, ProfileRunner, WorkerStatus,
};
