//! Pipeline block and profile structs as they appear in a profile document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of operations a pipeline block can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Decode,
    Resize,
    Crop,
    EmbedProfile,
    Encode,
    Write,
}

impl OperationKind {
    /// All kinds, in declaration order.
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Decode,
        OperationKind::Resize,
        OperationKind::Crop,
        OperationKind::EmbedProfile,
        OperationKind::Encode,
        OperationKind::Write,
    ];

    /// The tag used for this kind in profile documents.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Decode => "decode",
            OperationKind::Resize => "resize",
            OperationKind::Crop => "crop",
            OperationKind::EmbedProfile => "icc_embed",
            OperationKind::Encode => "encode",
            OperationKind::Write => "write",
        }
    }

    /// Parse a document tag. Matching is exact, like the document keys.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `operation` field of a block.
///
/// Unrecognised tags are kept verbatim rather than failing the YAML parse,
/// so that they surface as validation errors naming the bad tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockTag {
    Known(OperationKind),
    Unknown(String),
}

impl From<String> for BlockTag {
    fn from(tag: String) -> Self {
        match OperationKind::from_tag(&tag) {
            Some(kind) => BlockTag::Known(kind),
            None => BlockTag::Unknown(tag),
        }
    }
}

impl From<BlockTag> for String {
    fn from(tag: BlockTag) -> Self {
        match tag {
            BlockTag::Known(kind) => kind.as_str().to_string(),
            BlockTag::Unknown(tag) => tag,
        }
    }
}

impl From<OperationKind> for BlockTag {
    fn from(kind: OperationKind) -> Self {
        BlockTag::Known(kind)
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Known(kind) => f.write_str(kind.as_str()),
            BlockTag::Unknown(tag) => f.write_str(tag),
        }
    }
}

/// Resampling filter used by resize blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAlgorithm {
    #[serde(alias = "nearest")]
    NearestNeighbor,
    #[serde(alias = "bilinear", alias = "triangle")]
    ApproxBilinear,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Resize settings.
///
/// `factor` takes priority over `width`, which takes priority over `height`.
/// Zero means "not set".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Target width in pixels (height follows the aspect ratio)
    pub width: u32,

    /// Target height in pixels (width follows the aspect ratio)
    pub height: u32,

    /// Uniform scale factor
    pub factor: f32,

    /// Resampling filter
    pub algorithm: ResizeAlgorithm,
}

/// The single sizing strategy a resize block resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    ByFactor(f32),
    ByWidth(u32),
    ByHeight(u32),
}

impl ResizeConfig {
    /// Resolve the active sizing strategy, or `None` if nothing is set.
    pub fn mode(&self) -> Option<ResizeMode> {
        if self.factor != 0.0 {
            Some(ResizeMode::ByFactor(self.factor))
        } else if self.width != 0 {
            Some(ResizeMode::ByWidth(self.width))
        } else if self.height != 0 {
            Some(ResizeMode::ByHeight(self.height))
        } else {
            None
        }
    }
}

/// Where a crop window is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAlignment {
    #[default]
    Center,
    TopLeft,
}

/// Crop settings. A zero dimension keeps the full source dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub alignment: CropAlignment,
    pub width: u32,
    pub height: u32,
}

/// Codec-specific encoder options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// JPEG quality (1-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

/// Encode settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Output container/codec: jpeg, png, webp, gif, bmp or tiff
    pub format: String,

    /// Encoder options, forwarded unchanged to the encoder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<EncoderOptions>,
}

/// ICC profile embedding settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IccEmbedConfig {
    /// A path to an ICC file, or a name looked up in the ICC search path
    pub profile_name: String,
}

/// Output naming for write blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    /// Output format; only affects the file extension
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_prefix: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_suffix: String,
}

/// One declared step of a profile.
///
/// Only the payload matching `operation` is consulted; the validator
/// guarantees it is present before the block is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineBlock {
    pub operation: BlockTag,

    #[serde(
        rename = "resize_config",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resize: Option<ResizeConfig>,

    #[serde(rename = "crop_config", default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropConfig>,

    #[serde(
        rename = "icc_embed_config",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub icc_embed: Option<IccEmbedConfig>,

    #[serde(
        rename = "encode_config",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub encode: Option<EncodeConfig>,

    #[serde(
        rename = "write_config",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub write: Option<OutputConfig>,
}

impl PipelineBlock {
    /// A block with the given tag and no payload.
    pub fn bare(operation: impl Into<BlockTag>) -> Self {
        Self {
            operation: operation.into(),
            resize: None,
            crop: None,
            icc_embed: None,
            encode: None,
            write: None,
        }
    }

    pub fn decode() -> Self {
        Self::bare(OperationKind::Decode)
    }

    pub fn resize(config: ResizeConfig) -> Self {
        Self {
            resize: Some(config),
            ..Self::bare(OperationKind::Resize)
        }
    }

    pub fn crop(config: CropConfig) -> Self {
        Self {
            crop: Some(config),
            ..Self::bare(OperationKind::Crop)
        }
    }

    pub fn embed_profile(config: IccEmbedConfig) -> Self {
        Self {
            icc_embed: Some(config),
            ..Self::bare(OperationKind::EmbedProfile)
        }
    }

    pub fn encode(config: EncodeConfig) -> Self {
        Self {
            encode: Some(config),
            ..Self::bare(OperationKind::Encode)
        }
    }

    pub fn write(config: OutputConfig) -> Self {
        Self {
            write: Some(config),
            ..Self::bare(OperationKind::Write)
        }
    }

    /// The declared kind, if the tag is recognised.
    pub fn kind(&self) -> Option<OperationKind> {
        match self.operation {
            BlockTag::Known(kind) => Some(kind),
            BlockTag::Unknown(_) => None,
        }
    }
}

/// A named, ordered pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageProcessingProfile {
    /// Profile identifier (used in logs and reports)
    pub profile_name: String,

    /// Blocks in execution order
    pub pipeline_blocks: Vec<PipelineBlock>,
}

impl ImageProcessingProfile {
    pub fn new(name: impl Into<String>, blocks: Vec<PipelineBlock>) -> Self {
        Self {
            profile_name: name.into(),
            pipeline_blocks: blocks,
        }
    }
}
