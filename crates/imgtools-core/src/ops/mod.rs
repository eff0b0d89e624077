//! Image operations applied by pipelines.
//!
//! - **working**: the in-flight image value each worker owns
//! - **chain**: error-latching application of operations
//! - **decode**: content-sniffing decode
//! - **transform**: resize and crop
//! - **encode**: encoders and ICC profile embedding
//! - **write**: writing the result to disk
//!
//! Pixel work is delegated to the `image` crate.

pub mod chain;
pub mod decode;
pub mod encode;
pub mod transform;
pub mod working;
pub mod write;

pub use chain::Chain;
pub use decode::Decode;
pub use encode::{system_icc_dirs, EmbedProfile, Encode};
pub use transform::{Crop, Resize};
pub use working::{EncodedImage, WorkingImage};
pub use write::WriteToFile;

use crate::error::PipelineResult;

/// One transformation step applied to a working image.
pub trait Operation: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply the step, returning the updated image or the error that stopped it.
    fn apply(&self, image: WorkingImage) -> PipelineResult<WorkingImage>;
}
