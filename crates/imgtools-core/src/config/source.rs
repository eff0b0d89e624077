//! Configuration sources.
//!
//! The engine never reads configuration from disk on its own; the entry
//! point hands it a list of sources. This keeps the per-user default
//! profile (a process-wide side effect) out of the core and lets tests use
//! in-memory sources.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::ProfileRoot;

/// Name of the per-user directory holding default profiles.
pub const PROFILE_DIR_NAME: &str = ".imgtools";

/// File name of the per-user default profile.
pub const DEFAULT_PROFILE_FILE: &str = "default.yaml";

/// Something that can produce a validated profile root.
pub trait ProfileSource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    /// Load and validate the root. Any invalid profile fails the load.
    fn load(&self) -> Result<ProfileRoot, ConfigError>;
}

/// A profile document on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ProfileRoot, ConfigError> {
        ProfileRoot::load_from(&self.path)
    }
}

/// The per-user default profile, created from the passthrough
/// configuration the first time it is requested.
#[derive(Debug, Clone)]
pub struct DefaultProfileSource {
    dir: PathBuf,
}

impl DefaultProfileSource {
    /// `default.yaml` under `~/.imgtools`.
    pub fn new() -> Result<Self, ConfigError> {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::in_dir(home.join(PROFILE_DIR_NAME)))
    }

    /// `default.yaml` in an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the profile file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(DEFAULT_PROFILE_FILE)
    }

    fn ensure_exists(&self) -> Result<PathBuf, ConfigError> {
        let path = self.path();
        if path.exists() {
            return Ok(path);
        }

        let io_err = |source| ConfigError::Read {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let yaml = ProfileRoot::passthrough().to_yaml()?;
        std::fs::write(&path, yaml).map_err(io_err)?;
        tracing::info!("Created default profile at {}", path.display());
        Ok(path)
    }
}

impl ProfileSource for DefaultProfileSource {
    fn describe(&self) -> String {
        self.path().display().to_string()
    }

    fn load(&self) -> Result<ProfileRoot, ConfigError> {
        let path = self.ensure_exists()?;
        ProfileRoot::load_from(&path)
    }
}

/// An in-memory root.
#[derive(Debug, Clone)]
pub struct StaticSource {
    label: String,
    root: ProfileRoot,
}

impl StaticSource {
    pub fn new(label: impl Into<String>, root: ProfileRoot) -> Self {
        Self {
            label: label.into(),
            root,
        }
    }
}

impl ProfileSource for StaticSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn load(&self) -> Result<ProfileRoot, ConfigError> {
        self.root.validate()?;
        Ok(self.root.clone())
    }
}

impl ProfileRoot {
    /// Load every source and merge the results in order.
    ///
    /// A source that fails to load is logged and left out. The call fails
    /// only if no source loaded or the merged root declares no profile.
    pub fn from_sources(sources: &[Box<dyn ProfileSource>]) -> Result<Self, ConfigError> {
        let mut loaded = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();

        for source in sources {
            match source.load() {
                Ok(root) => {
                    tracing::debug!(
                        "Config source {} provided {} profile(s)",
                        source.describe(),
                        root.profiles.len()
                    );
                    loaded.push(root);
                }
                Err(e) => {
                    tracing::error!(
                        "Error while loading config {}: {e}. The config will be ignored.",
                        source.describe()
                    );
                    failures.push(source.describe());
                }
            }
        }

        if loaded.is_empty() {
            return Err(ConfigError::NoProfiles(if failures.is_empty() {
                "no configuration source given".to_string()
            } else {
                format!("every source failed to load ({})", failures.join(", "))
            }));
        }

        let merged = ProfileRoot::merge(loaded);
        if merged.is_empty() {
            return Err(ConfigError::NoProfiles(
                "the configuration declares no profiles".to_string(),
            ));
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageProcessingProfile, OperationKind, PipelineBlock};

    fn boxed<S: ProfileSource + 'static>(source: S) -> Box<dyn ProfileSource> {
        Box::new(source)
    }

    fn invalid_root() -> ProfileRoot {
        ProfileRoot {
            profiles: vec![ImageProcessingProfile::new(
                "bad",
                vec![PipelineBlock::bare(OperationKind::Crop)],
            )],
        }
    }

    #[test]
    fn test_default_source_creates_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let source = DefaultProfileSource::in_dir(dir.path().join("profiles"));
        assert!(!source.path().exists());

        let root = source.load().unwrap();
        assert_eq!(root, ProfileRoot::passthrough());
        assert!(source.path().exists());
        assert!(source.path().ends_with("profiles/default.yaml"));
    }

    #[test]
    fn test_default_source_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DefaultProfileSource::in_dir(dir.path());
        std::fs::write(
            source.path(),
            "profiles:\n  - profileName: mine\n    pipelineBlocks:\n      - operation: decode\n",
        )
        .unwrap();

        let root = source.load().unwrap();
        assert_eq!(root.profiles[0].profile_name, "mine");
    }

    #[test]
    fn test_default_source_existing_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = DefaultProfileSource::in_dir(dir.path());
        std::fs::write(source.path(), invalid_root().to_yaml().unwrap()).unwrap();
        assert!(matches!(
            source.load().unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_from_sources_merges_in_order() {
        let mut second = ProfileRoot::passthrough();
        second.profiles[0].profile_name = "second".to_string();
        let sources = vec![
            boxed(StaticSource::new("a", ProfileRoot::passthrough())),
            boxed(StaticSource::new("b", second)),
        ];
        let merged = ProfileRoot::from_sources(&sources).unwrap();
        let names: Vec<_> = merged
            .profiles
            .iter()
            .map(|p| p.profile_name.as_str())
            .collect();
        assert_eq!(names, ["SampleProfile", "second"]);
    }

    #[test]
    fn test_from_sources_skips_failed_source() {
        let sources = vec![
            boxed(StaticSource::new("bad", invalid_root())),
            boxed(FileSource::new("/nonexistent/profile.yaml")),
            boxed(StaticSource::new("good", ProfileRoot::passthrough())),
        ];
        let merged = ProfileRoot::from_sources(&sources).unwrap();
        assert_eq!(merged, ProfileRoot::passthrough());
    }

    #[test]
    fn test_from_sources_all_failed_is_fatal() {
        let sources = vec![boxed(StaticSource::new("bad", invalid_root()))];
        let err = ProfileRoot::from_sources(&sources).unwrap_err();
        assert!(matches!(err, ConfigError::NoProfiles(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_sources_empty_root_is_fatal() {
        let sources = vec![boxed(StaticSource::new("empty", ProfileRoot::default()))];
        assert!(matches!(
            ProfileRoot::from_sources(&sources).unwrap_err(),
            ConfigError::NoProfiles(_)
        ));
    }
}
