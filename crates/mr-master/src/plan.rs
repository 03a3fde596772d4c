//! Turning an input path into a list of file jobs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::BatchError;

/// Name of the output directory created next to the input.
pub const OUTPUT_DIR_NAME: &str = "reverse";

/// Appended to the input file stem to form the output file name.
const OUTPUT_SUFFIX: &str = "_reverse.mid";

/// One file to reverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Every job of a batch, plus the directory they write into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub output_dir: PathBuf,
    pub jobs: Vec<Job>,
}

impl Plan {
    /// Resolve `input` (relative paths against `cwd`) into a plan.
    ///
    /// A directory contributes every MIDI file directly inside it, sorted by
    /// path, and defaults its output to `<input>/reverse`. A single file
    /// defaults its output to `<cwd>/reverse`.
    pub fn resolve(
        input: &Path,
        output_dir: Option<&Path>,
        cwd: &Path,
    ) -> Result<Self, BatchError> {
        let input = cwd.join(input);

        let (inputs, default_dir) = if input.is_dir() {
            (midi_files_in(&input), input.join(OUTPUT_DIR_NAME))
        } else if input.is_file() {
            (vec![input.clone()], cwd.join(OUTPUT_DIR_NAME))
        } else {
            return Err(BatchError::InputNotFound { path: input });
        };

        if inputs.is_empty() {
            return Err(BatchError::NoInputFiles { path: input });
        }

        let output_dir = output_dir.map_or(default_dir, |dir| cwd.join(dir));
        let jobs = inputs
            .into_iter()
            .map(|input| Job {
                output: output_dir.join(output_file_name(&input)),
                input,
            })
            .collect();

        Ok(Self { output_dir, jobs })
    }
}

/// `song.mid` → `song_reverse.mid`.
fn output_file_name(input: &Path) -> OsString {
    let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push(OUTPUT_SUFFIX);
    name
}

/// True for `.mid` and `.midi`, any case.
fn is_midi_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"))
}

fn midi_files_in(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_midi_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}
