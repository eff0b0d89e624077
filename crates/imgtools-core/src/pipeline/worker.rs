//! One worker: one profile applied to one input.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ValidatedProfile;
use crate::error::{PipelineError, PipelineResult};

use super::{executor, CancellationToken, ExecutionContext};

/// Runs a profile against an execution context.
///
/// The seam between the batch scheduling and the image work, so the
/// scheduling can be exercised without touching pixels.
pub trait ProfileRunner: Send + Sync + 'static {
    fn run(&self, profile: &ValidatedProfile, ctx: &ExecutionContext) -> PipelineResult<()>;
}

/// The runner that actually reads, transforms and writes images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePipelineRunner;

impl ProfileRunner for ImagePipelineRunner {
    fn run(&self, profile: &ValidatedProfile, ctx: &ExecutionContext) -> PipelineResult<()> {
        executor::execute(profile, ctx)
    }
}

/// Work handed to a single worker.
#[derive(Debug, Clone)]
pub struct ProfileJob {
    pub profile: Arc<ValidatedProfile>,
    pub context: Arc<ExecutionContext>,
}

/// How a worker ended.
#[derive(Debug)]
pub enum WorkerStatus {
    Completed,
    Failed(PipelineError),
    /// Cancellation was observed before the pipeline started.
    Cancelled,
}

impl WorkerStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerStatus::Completed)
    }
}

/// The result of one worker.
#[derive(Debug)]
pub struct ProfileOutcome {
    pub profile: String,
    pub input: PathBuf,
    pub status: WorkerStatus,
}

/// Run one job to completion.
///
/// Cancellation is checked once at entry. The pipeline itself runs on the
/// blocking pool and is never interrupted midway. A worker that panics is
/// reported as a failure instead of tearing down the batch.
pub async fn run_worker<R: ProfileRunner>(
    job: ProfileJob,
    runner: Arc<R>,
    cancel: CancellationToken,
) -> ProfileOutcome {
    let profile = job.profile.name.clone();
    let input = job.context.input().to_path_buf();

    if cancel.is_cancelled() {
        tracing::debug!("Skipping profile '{}' on {:?}: cancelled", profile, input);
        return ProfileOutcome {
            profile,
            input,
            status: WorkerStatus::Cancelled,
        };
    }

    let ProfileJob {
        profile: shared_profile,
        context,
    } = job;
    let joined =
        tokio::task::spawn_blocking(move || runner.run(&shared_profile, &context)).await;

    let status = match joined {
        Ok(Ok(())) => WorkerStatus::Completed,
        Ok(Err(e)) => WorkerStatus::Failed(e),
        Err(e) => WorkerStatus::Failed(PipelineError::Worker {
            profile: profile.clone(),
            message: e.to_string(),
        }),
    };

    match &status {
        WorkerStatus::Failed(e) => {
            tracing::error!("Profile '{}' failed on {:?}: {e}", profile, input)
        }
        _ => tracing::info!("Profile '{}' completed on {:?}", profile, input),
    }

    ProfileOutcome {
        profile,
        input,
        status,
    }
}
