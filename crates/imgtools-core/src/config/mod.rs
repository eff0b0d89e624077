//! Profile configuration for imgtools.
//!
//! A profile document is YAML holding a list of named profiles, each an
//! ordered list of pipeline blocks. Documents from several sources merge by
//! concatenation. Without any source, the per-user default profile at
//! `~/.imgtools/default.yaml` is used (and created if absent).

mod source;
mod types;
mod validate;

pub use source::{DefaultProfileSource, FileSource, ProfileSource, StaticSource};
pub use types::*;
pub use validate::{validate_block, validate_profile, validate_root, Step, ValidatedProfile};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root of a profile document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRoot {
    /// Profiles in declaration order
    pub profiles: Vec<ImageProcessingProfile>,
}

impl ProfileRoot {
    /// A configuration that re-encodes each input as JPEG without changing it.
    ///
    /// Decode → Encode(jpeg) → Write(suffix `_output`).
    pub fn passthrough() -> Self {
        Self {
            profiles: vec![ImageProcessingProfile::new(
                "SampleProfile",
                vec![
                    PipelineBlock::decode(),
                    PipelineBlock::encode(EncodeConfig {
                        format: "jpeg".to_string(),
                        options: None,
                    }),
                    PipelineBlock::write(OutputConfig {
                        name_suffix: "_output".to_string(),
                        ..Default::default()
                    }),
                ],
            )],
        }
    }

    /// Concatenate roots in order. Profile names are not deduplicated.
    pub fn merge<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = ProfileRoot>,
    {
        roots
            .into_iter()
            .fold(Self::default(), |acc, root| acc.append(root))
    }

    /// Append another root's profiles after this root's.
    pub fn append(mut self, other: ProfileRoot) -> Self {
        self.profiles.extend(other.profiles);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Parse a document without validating it.
    ///
    /// `origin` names the document in error messages.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    /// Load and validate a profile document from a file.
    ///
    /// Any invalid profile fails the whole load.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = Self::from_yaml(&content, &path.display().to_string())?;
        root.validate()?;
        tracing::debug!(
            "Loaded {} profile(s) from {}",
            root.profiles.len(),
            path.display()
        );
        Ok(root)
    }

    /// Serialize to a YAML document.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
profiles:
  - profileName: web
    pipelineBlocks:
      - operation: decode
      - operation: resize
        resize_config:
          width: 1200
          height: 800
          factor: 0.0
          algorithm: catmullrom
      - operation: crop
        crop_config:
          alignment: topleft
          width: 1000
          height: 700
      - operation: icc_embed
        icc_embed_config:
          profileName: sRGB
      - operation: encode
        encode_config:
          format: jpeg
          options:
            quality: 85
      - operation: write
        write_config:
          format: jpeg
          namePrefix: "web_"
          nameSuffix: "_1200"
  - profileName: archive
    pipelineBlocks:
      - operation: decode
      - operation: encode
        encode_config:
          format: png
      - operation: write
        write_config:
          nameSuffix: "_archive"
unrelated_setting: true
"#;

    fn named(names: &[&str]) -> ProfileRoot {
        ProfileRoot {
            profiles: names
                .iter()
                .map(|n| ImageProcessingProfile::new(*n, vec![PipelineBlock::decode()]))
                .collect(),
        }
    }

    fn names(root: &ProfileRoot) -> Vec<&str> {
        root.profiles
            .iter()
            .map(|p| p.profile_name.as_str())
            .collect()
    }

    #[test]
    fn test_parse_full_config() {
        let root = ProfileRoot::from_yaml(FULL_CONFIG, "test").unwrap();
        assert_eq!(names(&root), ["web", "archive"]);

        let web = &root.profiles[0];
        assert_eq!(web.pipeline_blocks.len(), 6);
        let resize = web.pipeline_blocks[1].resize.as_ref().unwrap();
        assert_eq!(resize.width, 1200);
        assert_eq!(resize.algorithm, ResizeAlgorithm::CatmullRom);
        let crop = web.pipeline_blocks[2].crop.as_ref().unwrap();
        assert_eq!(crop.alignment, CropAlignment::TopLeft);
        let encode = web.pipeline_blocks[4].encode.as_ref().unwrap();
        assert_eq!(encode.options.as_ref().unwrap().quality, Some(85));

        let archive = &root.profiles[1];
        let encode = archive.pipeline_blocks[1].encode.as_ref().unwrap();
        assert!(encode.options.is_none());
        assert!(root.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let root = ProfileRoot::from_yaml(FULL_CONFIG, "test").unwrap();
        let yaml = root.to_yaml().unwrap();
        let reloaded = ProfileRoot::from_yaml(&yaml, "round-trip").unwrap();
        assert_eq!(root, reloaded);
    }

    #[test]
    fn test_passthrough_round_trip() {
        let root = ProfileRoot::passthrough();
        let yaml = root.to_yaml().unwrap();
        assert!(yaml.contains("_output"));
        assert_eq!(ProfileRoot::from_yaml(&yaml, "default").unwrap(), root);
    }

    #[test]
    fn test_passthrough_shape() {
        let profiles = ProfileRoot::passthrough().validate().unwrap();
        assert_eq!(profiles.len(), 1);
        let kinds: Vec<_> = profiles[0].steps.iter().map(Step::kind).collect();
        assert_eq!(
            kinds,
            [
                OperationKind::Decode,
                OperationKind::Encode,
                OperationKind::Write
            ]
        );
    }

    #[test]
    fn test_merge_preserves_order() {
        let merged = ProfileRoot::merge([named(&["P1"]), named(&["P2", "P3"])]);
        assert_eq!(names(&merged), ["P1", "P2", "P3"]);
    }

    #[test]
    fn test_merge_is_associative() {
        let (a, b, c) = (named(&["P1"]), named(&["P2"]), named(&["P3", "P4"]));
        let left = ProfileRoot::merge([ProfileRoot::merge([a.clone(), b.clone()]), c.clone()]);
        let right = ProfileRoot::merge([a, ProfileRoot::merge([b, c])]);
        assert_eq!(left, right);
        assert_eq!(names(&left), ["P1", "P2", "P3", "P4"]);
    }

    #[test]
    fn test_merge_keeps_duplicate_names() {
        let merged = ProfileRoot::merge([named(&["same"]), named(&["same"])]);
        assert_eq!(merged.profiles.len(), 2);
    }

    #[test]
    fn test_load_rejects_root_with_one_bad_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        let yaml = r#"
profiles:
  - profileName: good
    pipelineBlocks:
      - operation: decode
  - profileName: bad
    pipelineBlocks:
      - operation: resize
"#;
        std::fs::write(&path, yaml).unwrap();
        let err = ProfileRoot::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.profile == "bad"));
    }

    #[test]
    fn test_load_rejects_unknown_operation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unknown.yaml");
        std::fs::write(
            &path,
            "profiles:\n  - profileName: p\n    pipelineBlocks:\n      - operation: blur\n",
        )
        .unwrap();
        let err = ProfileRoot::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("blur"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ProfileRoot::load_from(Path::new("/nonexistent/imgtools.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = ProfileRoot::from_yaml("profiles: [", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
