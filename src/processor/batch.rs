//! Concurrent batch processing of many files
//!
//! Files are processed on the blocking pool with bounded concurrency. A
//! failing file is logged and counted; it never aborts the batch.

use super::{FileProcessor, ReportWriter};
use crate::error::{HfrError, Result};
use crate::models::ProcessingStats;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{error, warn};

/// Outcome of one successfully processed file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub cells: usize,
    pub good: usize,
}

/// Runs the per-file pipeline over a set of files
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    processor: Arc<FileProcessor>,
    writer: Arc<ReportWriter>,
    workers: usize,
    show_progress: bool,
}

impl BatchProcessor {
    pub fn new(processor: FileProcessor, writer: ReportWriter) -> Self {
        let workers = processor.config().workers.max(1);
        Self {
            processor: Arc::new(processor),
            writer: Arc::new(writer),
            workers,
            show_progress: true,
        }
    }

    /// Disable the progress bar and console summary
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Process and write every file, returning aggregate statistics
    pub async fn process(&self, files: Vec<PathBuf>) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let output_path = self.writer.output_dir().to_path_buf();

        if files.is_empty() {
            warn!("No input files to process");
            return Ok(ProcessingStats {
                output_path,
                processing_time_ms: start_time.elapsed().as_millis(),
                ..Default::default()
            });
        }

        if self.show_progress {
            println!(
                "{} {} files with {} workers",
                "Processing".bright_yellow(),
                files.len().to_string().bright_white().bold(),
                self.workers
            );
        }

        let progress = if self.show_progress {
            create_progress_bar(files.len() as u64, "Running QC")
        } else {
            ProgressBar::hidden()
        };

        let outcomes = stream::iter(files)
            .map(|path| {
                let processor = self.processor.clone();
                let writer = self.writer.clone();
                async move {
                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || {
                        let report = processor.process_file(&task_path)?;
                        let output = writer.write(&report)?;
                        Ok::<_, HfrError>(FileOutcome {
                            source: task_path,
                            output,
                            cells: report.cell_count(),
                            good: report.good_count(),
                        })
                    })
                    .await
                    .map_err(|e| HfrError::ProcessingFailed {
                        path: path.clone(),
                        reason: format!("Processing task failed: {}", e),
                    })
                    .and_then(|inner| inner);
                    (path, result)
                }
            })
            .buffer_unordered(self.workers)
            .inspect(|_| progress.inc(1))
            .collect::<Vec<_>>()
            .await;

        progress.finish_with_message("QC complete");

        let mut stats = ProcessingStats {
            output_path,
            ..Default::default()
        };
        for (path, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    stats.files_processed += 1;
                    stats.total_cells += outcome.cells;
                    stats.flagged_good += outcome.good;
                }
                Err(e) => {
                    error!("Failed to process {}: {}", path.display(), e);
                    stats.files_failed += 1;
                }
            }
        }
        stats.processing_time_ms = start_time.elapsed().as_millis();

        if self.show_progress {
            print_summary(&stats);
        }

        Ok(stats)
    }
}

/// Create a progress bar with appropriate styling
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} ETA: {eta}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} ({} good)",
        "Grid cells:".bright_cyan(),
        stats.total_cells.to_string().bright_white().bold(),
        stats.flagged_good
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
}
