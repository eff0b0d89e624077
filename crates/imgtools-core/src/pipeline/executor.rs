//! Runs a validated profile against one input file.

use std::time::Instant;

use crate::config::ValidatedProfile;
use crate::error::PipelineResult;
use crate::ops::{Chain, Operation, WorkingImage};

use super::{translate, ExecutionContext};

/// Apply `operations` in order, stopping at the first failure.
///
/// Operations after a failing one are never invoked.
pub fn run_chain<I>(image: WorkingImage, operations: I) -> PipelineResult<WorkingImage>
where
    I: IntoIterator<Item = Box<dyn Operation>>,
{
    let mut chain = Chain::new(image);
    for op in operations {
        chain = chain.then(op.as_ref());
        if let Some(e) = chain.last_error() {
            tracing::debug!("Operation '{}' failed: {e}", op.name());
            break;
        }
    }
    chain.finish()
}

/// Read the input named by `ctx` and run `profile` over it.
///
/// Steps are translated one at a time, so nothing after the first failure
/// is built or run. The working image is dropped before returning.
pub fn execute(profile: &ValidatedProfile, ctx: &ExecutionContext) -> PipelineResult<()> {
    let start = Instant::now();
    let image = WorkingImage::open(ctx.input())?;
    let result = run_chain(image, translate(profile, ctx)).map(|_| ());

    tracing::debug!(
        "Profile '{}' on {:?} finished in {:.1}ms",
        profile.name,
        ctx.input(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    result
}
