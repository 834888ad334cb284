//! Results sinks receiving one summary per evaluated generation.

use crate::genetics::Genotype;
use crate::stats::{GenerationSummary, SummaryHistory};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Errors that can occur while writing results
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("results sink lock poisoned")]
    Poisoned,
}

/// Receives every generation right after fitness calculation, before reordering
pub trait ResultsSink {
    fn write_generation_summary(
        &mut self,
        generation: u32,
        population: &[Genotype],
    ) -> Result<(), ResultsError>;
}

impl ResultsSink for SummaryHistory {
    fn write_generation_summary(
        &mut self,
        generation: u32,
        population: &[Genotype],
    ) -> Result<(), ResultsError> {
        if let Some(summary) = GenerationSummary::from_population(generation, population) {
            self.record(summary);
        }
        Ok(())
    }
}

/// Lets the owner keep reading a sink handed to the genetic algorithm
impl<S: ResultsSink> ResultsSink for Arc<Mutex<S>> {
    fn write_generation_summary(
        &mut self,
        generation: u32,
        population: &[Genotype],
    ) -> Result<(), ResultsError> {
        self.lock()
            .map_err(|_| ResultsError::Poisoned)?
            .write_generation_summary(generation, population)
    }
}

/// Fan out to two sinks; both are written even if the first fails
impl<A: ResultsSink, B: ResultsSink> ResultsSink for (A, B) {
    fn write_generation_summary(
        &mut self,
        generation: u32,
        population: &[Genotype],
    ) -> Result<(), ResultsError> {
        let first = self.0.write_generation_summary(generation, population);
        let second = self.1.write_generation_summary(generation, population);
        first.and(second)
    }
}

/// Append-only text file, one line per generation.
///
/// Each run gets its own file `<dir>/<track>/<track>_sim<N>`, with `N` the
/// smallest index not already taken.
pub struct FileResultsSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileResultsSink {
    /// Pick a fresh run file for `track` under `directory` and open it
    pub fn create<P: AsRef<Path>>(directory: P, track: &str) -> Result<Self, ResultsError> {
        let name = track_name(track);
        let track_dir = directory.as_ref().join(&name);
        std::fs::create_dir_all(&track_dir)?;

        let path = next_run_path(&track_dir, &name);
        let file = OpenOptions::new().create_new(true).append(true).open(&path)?;
        log::info!("Writing generation results to {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsSink for FileResultsSink {
    fn write_generation_summary(
        &mut self,
        generation: u32,
        population: &[Genotype],
    ) -> Result<(), ResultsError> {
        if let Some(summary) = GenerationSummary::from_population(generation, population) {
            writeln!(self.writer, "{}", summary)?;
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Last path segment of a track identifier, cut at its first `.`
fn track_name(track: &str) -> String {
    let last = track.rsplit('/').next().unwrap_or(track);
    let stem = last.split('.').next().unwrap_or(last);
    if stem.is_empty() {
        "default".to_string()
    } else {
        stem.to_string()
    }
}

fn next_run_path(track_dir: &Path, name: &str) -> PathBuf {
    (1u32..)
        .map(|n| track_dir.join(format!("{}_sim{}", name, n)))
        .find(|path| !path.exists())
        .unwrap_or_else(|| track_dir.join(format!("{}_sim", name)))
}
