//! Translation of validated steps into runnable operations.

use crate::config::{ResizeMode, Step, ValidatedProfile};
use crate::ops::{Crop, Decode, EmbedProfile, Encode, Operation, Resize, WriteToFile};

use super::ExecutionContext;

impl Step {
    /// Build the operation this step stands for, bound to `ctx`.
    ///
    /// Total over every step: validation already guaranteed each payload.
    pub fn to_operation(&self, ctx: &ExecutionContext) -> Box<dyn Operation> {
        match self {
            Step::Decode => Box::new(Decode),
            Step::Resize { mode, algorithm } => Box::new(match *mode {
                ResizeMode::ByFactor(factor) => Resize::by_factor(*algorithm, factor),
                ResizeMode::ByWidth(width) => Resize::by_width(*algorithm, width),
                ResizeMode::ByHeight(height) => Resize::by_height(*algorithm, height),
            }),
            Step::Crop(config) => Box::new(Crop::new(config.width, config.height, config.alignment)),
            Step::EmbedProfile(config) => Box::new(EmbedProfile::new(
                config.profile_name.clone(),
                ctx.icc_search_path().to_vec(),
            )),
            Step::Encode(config) => {
                Box::new(Encode::new(config.format.clone(), config.options.clone()))
            }
            Step::Write(config) => Box::new(WriteToFile::new(ctx.output_path(config))),
        }
    }
}

/// Translate the steps of `profile` in declaration order.
///
/// Lazy: a step is only built when the iterator reaches it.
pub fn translate<'a>(
    profile: &'a ValidatedProfile,
    ctx: &'a ExecutionContext,
) -> impl Iterator<Item = Box<dyn Operation>> + 'a {
    profile.steps.iter().map(move |step| step.to_operation(ctx))
}
