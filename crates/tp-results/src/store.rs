//! On-disk run cache.
//!
//! One directory per run id under the store root:
//! `<root>/<run_id>/manifest.json` holds the [`RunManifest`] and
//! `<root>/<run_id>/timeseries.jsonl` holds one [`TimeseriesRecord`] per line.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{RunManifest, TimeseriesRecord};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const TIMESERIES_FILE: &str = "timeseries.jsonl";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    /// Open (and create if needed) a store rooted at `root_dir`.
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    /// Store under `<dir>/.thermopid/runs`.
    pub fn in_dir(dir: &Path) -> ResultsResult<Self> {
        if dir.is_file() {
            return Err(ResultsError::InvalidPath {
                message: format!("{} is a file, expected a directory", dir.display()),
            });
        }
        Self::new(dir.join(".thermopid").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.file(run_id, MANIFEST_FILE).is_file()
    }

    /// Write a run, replacing any previous run with the same id.
    ///
    /// Runs holding NaN or infinite values are refused with
    /// [`ResultsError::NonFiniteRun`]; nothing is written for them.
    pub fn save_run(&self, manifest: &RunManifest, records: &[TimeseriesRecord]) -> ResultsResult<()> {
        if !manifest.summary.is_finite() || !records.iter().all(TimeseriesRecord::is_finite) {
            return Err(ResultsError::NonFiniteRun {
                run_id: manifest.run_id.clone(),
            });
        }
        fs::create_dir_all(self.root_dir.join(&manifest.run_id))?;

        let mut out = BufWriter::new(File::create(self.file(&manifest.run_id, MANIFEST_FILE))?);
        serde_json::to_writer_pretty(&mut out, manifest)?;
        out.flush()?;

        write_jsonl(&self.file(&manifest.run_id, TIMESERIES_FILE), records)?;

        debug!(run_id = %manifest.run_id, records = records.len(), "saved run");
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let path = self.existing_file(run_id, MANIFEST_FILE)?;
        let manifest = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        Ok(manifest)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TimeseriesRecord>> {
        read_jsonl(&self.existing_file(run_id, TIMESERIES_FILE)?)
    }

    pub fn load_run(&self, run_id: &str) -> ResultsResult<(RunManifest, Vec<TimeseriesRecord>)> {
        let manifest = self.load_manifest(run_id)?;
        let records = self.load_timeseries(run_id)?;
        debug!(run_id, records = records.len(), "loaded run");
        Ok((manifest, records))
    }

    /// All readable runs, oldest first. Directories without a valid manifest
    /// are skipped.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        if !self.root_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().into_owned();
            match self.load_manifest(&run_id) {
                Ok(manifest) => runs.push(manifest),
                Err(err) => warn!(run_id, error = %err, "skipping unreadable run"),
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    /// Remove a run. Missing runs are not an error.
    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let dir = self.root_dir.join(run_id);
        if dir.is_dir() {
            fs::remove_dir_all(dir)?;
            debug!(run_id, "deleted run");
        }
        Ok(())
    }

    fn file(&self, run_id: &str, name: &str) -> PathBuf {
        self.root_dir.join(run_id).join(name)
    }

    fn existing_file(&self, run_id: &str, name: &str) -> ResultsResult<PathBuf> {
        let path = self.file(run_id, name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            })
        }
    }
}

fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> ResultsResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn read_jsonl<T: DeserializeOwned>(path: &Path) -> ResultsResult<Vec<T>> {
    let mut rows = Vec::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}
