//! Headless batch driver for midireverse.
//!
//! Resolves an input path into jobs and runs each one through
//! load, reverse and save. The CLI is a thin shell around [`Plan`] and
//! [`run`].

mod plan;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

// Re-export so callers don't need mr-formats directly.
pub use mr_formats::FormatError;

pub use plan::{Job, Plan, OUTPUT_DIR_NAME};

/// Error type for batch planning and per-file processing.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("file or directory {} not found", path.display())]
    InputNotFound { path: PathBuf },
    #[error("no .mid files found in {}", path.display())]
    NoInputFiles { path: PathBuf },
    #[error("failed to create output directory {}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("failed to save file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// Outcome counts of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub errors: usize,
}

/// Load `input`, reverse it, and write the result to `output`.
///
/// An existing `output` is overwritten.
pub fn reverse_file(input: &Path, output: &Path) -> Result<(), BatchError> {
    let read_error = |source| BatchError::Read {
        path: input.to_path_buf(),
        source,
    };
    let data = fs::read(input).map_err(|e| read_error(FormatError::Io(e)))?;
    let stream = mr_formats::load_smf(&data).map_err(read_error)?;

    let reversed = mr_engine::reverse(&stream);
    log::debug!(
        "{}: {} notes, {} events -> {} tracks",
        input.display(),
        stream.note_count(),
        stream.event_count(),
        reversed.tracks.len()
    );

    mr_formats::save_smf(&reversed, output).map_err(|source| BatchError::Write {
        path: output.to_path_buf(),
        source,
    })
}

/// Run every job of `plan`.
///
/// Fails only when the output directory cannot be created. A job that
/// fails is logged and counted; the remaining jobs still run.
pub fn run(plan: &Plan) -> Result<BatchSummary, BatchError> {
    log::debug!(
        "{} job(s), output directory {}",
        plan.jobs.len(),
        plan.output_dir.display()
    );
    fs::create_dir_all(&plan.output_dir).map_err(|source| BatchError::CreateOutputDir {
        path: plan.output_dir.clone(),
        source,
    })?;

    let mut summary = BatchSummary::default();
    for job in &plan.jobs {
        match reverse_file(&job.input, &job.output) {
            Ok(()) => {
                log::info!("File saved: {}", job.output.display());
                summary.saved += 1;
            }
            Err(e) => {
                log::error!("{}: {}", e, error_source(&e));
                summary.errors += 1;
            }
        }
    }
    Ok(summary)
}

fn error_source(error: &BatchError) -> String {
    std::error::Error::source(error)
        .map(ToString::to_string)
        .unwrap_or_default()
}
