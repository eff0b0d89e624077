//! Batch processing with a progress bar and a closing summary.

use std::path::PathBuf;

use imgtools_core::{BatchCoordinator, BatchReport};

/// Run the coordinator over `inputs`, reporting progress per file.
pub async fn process_batch(
    coordinator: &BatchCoordinator,
    inputs: &[PathBuf],
) -> anyhow::Result<()> {
    let progress = create_progress_bar(inputs.len() as u64);
    let start_time = std::time::Instant::now();
    let mut done: u64 = 0;

    let report = coordinator
        .run_with(inputs, |input, file| {
            done += 1;
            progress.inc(1);
            if file.is_none() {
                progress.println(format!("  skipped {}", input.display()));
            }
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
            }
        })
        .await;

    progress.finish_and_clear();
    print_summary(&report, coordinator.profile_count());

    if !report.not_started.is_empty() {
        anyhow::bail!(
            "Interrupted: {} input(s) were not processed",
            report.not_started.len()
        );
    }
    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
fn print_summary(report: &BatchReport, profiles: usize) {
    let elapsed = report.elapsed.as_secs_f64();
    let rate = if elapsed > 0.0 {
        report.processed() as f64 / elapsed
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Files:        {:>8}", report.processed());
    eprintln!("    Profiles:     {:>8}", profiles);
    eprintln!("    Succeeded:    {:>8}", report.succeeded());
    if report.failed() > 0 {
        eprintln!("    Failed:       {:>8}", report.failed());
    }
    if report.cancelled() > 0 {
        eprintln!("    Cancelled:    {:>8}", report.cancelled());
    }
    if !report.skipped.is_empty() {
        eprintln!("    Skipped:      {:>8}", report.skipped.len());
    }
    if !report.not_started.is_empty() {
        eprintln!("    Not started:  {:>8}", report.not_started.len());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", elapsed);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");

    for (profile, input, error) in report.failures() {
        eprintln!("    [{profile}] {}: {error}", input.display());
    }
}
