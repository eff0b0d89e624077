//! Structural validation of pipeline blocks.
//!
//! Validation turns each declared block into a [`Step`] whose payload is
//! no longer optional. Anything downstream of validation works on steps, so
//! a missing payload or an unknown tag cannot reach the executor.

use crate::error::{BlockError, ValidationError};

use super::{
    BlockTag, CropConfig, EncodeConfig, IccEmbedConfig, ImageProcessingProfile, OperationKind,
    OutputConfig, PipelineBlock, ProfileRoot, ResizeAlgorithm, ResizeMode,
};

/// A validated pipeline block.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Decode,
    Resize {
        mode: ResizeMode,
        algorithm: ResizeAlgorithm,
    },
    Crop(CropConfig),
    EmbedProfile(IccEmbedConfig),
    Encode(EncodeConfig),
    Write(OutputConfig),
}

impl Step {
    pub fn kind(&self) -> OperationKind {
        match self {
            Step::Decode => OperationKind::Decode,
            Step::Resize { .. } => OperationKind::Resize,
            Step::Crop(_) => OperationKind::Crop,
            Step::EmbedProfile(_) => OperationKind::EmbedProfile,
            Step::Encode(_) => OperationKind::Encode,
            Step::Write(_) => OperationKind::Write,
        }
    }
}

/// A profile whose every block passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProfile {
    pub name: String,
    pub steps: Vec<Step>,
}

impl ValidatedProfile {
    /// Whether the profile writes an output file.
    pub fn has_write_step(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::Write(_)))
    }
}

/// Check that a block carries the payload its tag requires.
///
/// Payloads for other tags are ignored. A resize payload with no sizing
/// field set counts as missing; a factor must be positive and finite.
pub fn validate_block(block: &PipelineBlock) -> Result<Step, BlockError> {
    let kind = match &block.operation {
        BlockTag::Known(kind) => *kind,
        BlockTag::Unknown(tag) => return Err(BlockError::InvalidBlockType(tag.clone())),
    };
    let missing = || BlockError::MissingConfig(kind);

    match kind {
        OperationKind::Decode => Ok(Step::Decode),
        OperationKind::Resize => {
            let config = block.resize.as_ref().ok_or_else(missing)?;
            let mode = config.mode().ok_or_else(missing)?;
            if let ResizeMode::ByFactor(factor) = mode {
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(BlockError::InvalidResizeFactor(factor.to_string()));
                }
            }
            Ok(Step::Resize {
                mode,
                algorithm: config.algorithm,
            })
        }
        OperationKind::Crop => block
            .crop
            .clone()
            .map(Step::Crop)
            .ok_or_else(missing),
        OperationKind::EmbedProfile => block
            .icc_embed
            .clone()
            .map(Step::EmbedProfile)
            .ok_or_else(missing),
        OperationKind::Encode => block
            .encode
            .clone()
            .map(Step::Encode)
            .ok_or_else(missing),
        OperationKind::Write => block
            .write
            .clone()
            .map(Step::Write)
            .ok_or_else(missing),
    }
}

/// Validate every block of a profile, stopping at the first bad one.
pub fn validate_profile(
    profile: &ImageProcessingProfile,
) -> Result<ValidatedProfile, ValidationError> {
    let steps = profile
        .pipeline_blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            validate_block(block).map_err(|source| ValidationError {
                profile: profile.profile_name.clone(),
                index,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedProfile {
        name: profile.profile_name.clone(),
        steps,
    })
}

/// Validate every profile of a root. One bad profile rejects the root.
pub fn validate_root(root: &ProfileRoot) -> Result<Vec<ValidatedProfile>, ValidationError> {
    root.profiles.iter().map(validate_profile).collect()
}

impl ProfileRoot {
    /// Validate this root, returning executable profiles in declaration order.
    pub fn validate(&self) -> Result<Vec<ValidatedProfile>, ValidationError> {
        validate_root(self)
    }
}
