//! Batch coordination: every profile against every input file.
//!
//! Files are processed one at a time. For each file, one worker per
//! profile runs concurrently, and every worker reports before the next
//! file starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ValidatedProfile;
use crate::error::PipelineError;

use super::worker::{run_worker, ImagePipelineRunner, ProfileJob, ProfileOutcome, ProfileRunner};
use super::{CancellationToken, ExecutionContext, WorkerStatus};

/// Settings applied to every input of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Write outputs here instead of next to each input.
    pub output_dir: Option<PathBuf>,
    /// Directories searched for ICC profiles referenced by name.
    pub icc_search_path: Vec<PathBuf>,
}

impl BatchOptions {
    /// Bind an input path into an execution context.
    pub fn bind(&self, input: &Path) -> ExecutionContext {
        ExecutionContext::new(input)
            .with_output_dir(self.output_dir.clone())
            .with_icc_search_path(self.icc_search_path.clone())
    }
}

/// Outcomes of every profile for one input file.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcomes: Vec<ProfileOutcome>,
}

impl FileReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, WorkerStatus::Completed))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, WorkerStatus::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, WorkerStatus::Cancelled))
    }

    fn count(&self, pred: impl Fn(&WorkerStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Summary of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    /// Inputs skipped because they did not exist or were not files.
    pub skipped: Vec<PathBuf>,
    /// Inputs never started because the batch was cancelled.
    pub not_started: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().map(FileReport::succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().map(FileReport::failed).sum()
    }

    pub fn cancelled(&self) -> usize {
        self.files.iter().map(FileReport::cancelled).sum()
    }

    /// Every failed (profile, input, error) triple, in processing order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Path, &PipelineError)> {
        self.files.iter().flat_map(|f| {
            f.outcomes.iter().filter_map(|o| match &o.status {
                WorkerStatus::Failed(e) => Some((o.profile.as_str(), o.input.as_path(), e)),
                _ => None,
            })
        })
    }
}

/// Drives validated profiles over a list of inputs.
pub struct BatchCoordinator<R: ProfileRunner = ImagePipelineRunner> {
    profiles: Vec<Arc<ValidatedProfile>>,
    runner: Arc<R>,
    options: BatchOptions,
    cancel: CancellationToken,
}

impl BatchCoordinator<ImagePipelineRunner> {
    pub fn new(profiles: Vec<ValidatedProfile>, options: BatchOptions) -> Self {
        Self::with_runner(profiles, options, ImagePipelineRunner)
    }
}

impl<R: ProfileRunner> BatchCoordinator<R> {
    pub fn with_runner(profiles: Vec<ValidatedProfile>, options: BatchOptions, runner: R) -> Self {
        Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
            runner: Arc::new(runner),
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Run every profile against one input and wait for all of them.
    ///
    /// Returns `None` when the input does not exist or is not a regular
    /// file.
    pub async fn process_file(&self, input: &Path) -> Option<FileReport> {
        if !input.is_file() {
            tracing::warn!("Skipping {:?}: not found or not a regular file", input);
            return None;
        }

        let context = Arc::new(self.options.bind(input));
        let handles: Vec<_> = self
            .profiles
            .iter()
            .map(|profile| {
                let job = ProfileJob {
                    profile: Arc::clone(profile),
                    context: Arc::clone(&context),
                };
                let handle = tokio::spawn(run_worker(
                    job,
                    Arc::clone(&self.runner),
                    self.cancel.clone(),
                ));
                (profile.name.clone(), handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (profile, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => ProfileOutcome {
                    profile: profile.clone(),
                    input: input.to_path_buf(),
                    status: WorkerStatus::Failed(PipelineError::Worker {
                        profile,
                        message: e.to_string(),
                    }),
                },
            };
            outcomes.push(outcome);
        }

        Some(FileReport {
            input: input.to_path_buf(),
            outcomes,
        })
    }

    /// Process every input in order.
    pub async fn run(&self, inputs: &[PathBuf]) -> BatchReport {
        self.run_with(inputs, |_, _| {}).await
    }

    /// Process every input in order, calling `on_file` after each one with
    /// the input and its report (`None` if skipped).
    pub async fn run_with<F>(&self, inputs: &[PathBuf], mut on_file: F) -> BatchReport
    where
        F: FnMut(&Path, Option<&FileReport>),
    {
        let start = Instant::now();
        let mut report = BatchReport::default();

        for (i, input) in inputs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Cancelled; {} input(s) not started",
                    inputs.len() - i
                );
                report.not_started.extend(inputs[i..].iter().cloned());
                break;
            }

            match self.process_file(input).await {
                Some(file_report) => {
                    on_file(input, Some(&file_report));
                    report.files.push(file_report);
                }
                None => {
                    on_file(input, None);
                    report.skipped.push(input.clone());
                }
            }
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            "Batch finished: {} file(s), {} succeeded, {} failed, {} cancelled, {} skipped in {:.1}s",
            report.processed(),
            report.succeeded(),
            report.failed(),
            report.cancelled(),
            report.skipped.len(),
            report.elapsed.as_secs_f64()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EncodeConfig, OutputConfig, Step};
    use crate::error::PipelineResult;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn profile(name: &str) -> ValidatedProfile {
        ValidatedProfile {
            name: name.to_string(),
            steps: vec![],
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"x").unwrap();
        path
    }

    /// Records (event, input) pairs and fails profiles named "bad".
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(String, PathBuf)>>,
        calls: AtomicUsize,
    }

    impl ProfileRunner for Recorder {
        fn run(&self, profile: &ValidatedProfile, ctx: &ExecutionContext) -> PipelineResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let input = ctx.input().to_path_buf();
            self.events
                .lock()
                .unwrap()
                .push(("start".to_string(), input.clone()));
            std::thread::sleep(Duration::from_millis(5));
            self.events
                .lock()
                .unwrap()
                .push(("end".to_string(), input.clone()));
            if profile.name == "bad" {
                return Err(PipelineError::FileNotFound(input));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_one_outcome_per_profile() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "a.png");
        let coordinator = BatchCoordinator::with_runner(
            vec![profile("one"), profile("bad"), profile("three")],
            BatchOptions::default(),
            Recorder::default(),
        );

        let report = coordinator.process_file(&input).await.unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);

        let mut names: Vec<_> = report.outcomes.iter().map(|o| o.profile.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["bad", "one", "three"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_files_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.png");
        let b = touch(dir.path(), "b.png");
        let coordinator = BatchCoordinator::with_runner(
            vec![profile("p1"), profile("p2"), profile("p3")],
            BatchOptions::default(),
            Recorder::default(),
        );

        let report = coordinator.run(&[a.clone(), b.clone()]).await;
        assert_eq!(report.processed(), 2);
        assert_eq!(report.succeeded(), 6);

        let events = coordinator.runner.events.lock().unwrap().clone();
        let last_a = events.iter().rposition(|(_, p)| p == &a).unwrap();
        let first_b = events.iter().position(|(_, p)| p == &b).unwrap();
        assert!(last_a < first_b, "file b started before file a finished");
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = touch(dir.path(), "a.png");
        let missing = dir.path().join("missing.png");
        let coordinator = BatchCoordinator::with_runner(
            vec![profile("p")],
            BatchOptions::default(),
            Recorder::default(),
        );

        let mut seen = Vec::new();
        let report = coordinator
            .run_with(&[missing.clone(), present.clone()], |input, file| {
                seen.push((input.to_path_buf(), file.is_some()))
            })
            .await;

        assert_eq!(report.skipped, vec![missing.clone()]);
        assert_eq!(report.processed(), 1);
        assert_eq!(seen, vec![(missing, false), (present, true)]);
        assert_eq!(coordinator.runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_prevents_work() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "a.png");
        let cancel = CancellationToken::new();
        let coordinator = BatchCoordinator::with_runner(
            vec![profile("p1"), profile("p2")],
            BatchOptions::default(),
            Recorder::default(),
        )
        .with_cancellation(cancel.clone());
        cancel.cancel();

        let report = coordinator.process_file(&input).await.unwrap();
        assert_eq!(report.cancelled(), 2);
        assert_eq!(report.failed(), 0);
        assert_eq!(coordinator.runner.calls.load(Ordering::SeqCst), 0);

        let batch = coordinator.run(&[input.clone()]).await;
        assert_eq!(batch.processed(), 0);
        assert_eq!(batch.not_started, vec![input]);
    }

    #[tokio::test]
    async fn test_end_to_end_two_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        DynamicImage::new_rgb8(20, 10).save(&input).unwrap();
        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let encode_write = |name: &str, format: &str| ValidatedProfile {
            name: name.to_string(),
            steps: vec![
                Step::Decode,
                Step::Encode(EncodeConfig {
                    format: format.to_string(),
                    options: None,
                }),
                Step::Write(OutputConfig {
                    format: format.to_string(),
                    name_prefix: String::new(),
                    name_suffix: format!("_{name}"),
                }),
            ],
        };

        let coordinator = BatchCoordinator::new(
            vec![encode_write("a", "png"), encode_write("b", "jpeg")],
            BatchOptions {
                output_dir: Some(out_dir.clone()),
                icc_search_path: vec![],
            },
        );
        let report = coordinator.run(&[input]).await;

        assert_eq!(report.succeeded(), 2, "{:?}", report.failures().collect::<Vec<_>>());
        assert!(out_dir.join("photo_a.png").is_file());
        assert!(out_dir.join("photo_b.jpg").is_file());
    }
}
