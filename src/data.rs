use crate::error::InputError;
use crate::types::{PseudoRegion, RegionTotals};
use csv::ReaderBuilder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-dataset table name under `<summaries>/<dataset>/`.
pub const REGION_TABLE: &str = "by_region.tsv";

const REGION_COLUMN: &str = "region";
const BYTES_COLUMN: &str = "bytes_sent";

#[derive(Debug)]
pub enum FileOutcome {
    Loaded { rows: usize },
    Skipped(InputError),
}

/// Region totals plus what happened to every table that was found.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub totals: RegionTotals,
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&Path, &InputError)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Skipped(err) => Some((path.as_path(), err)),
            FileOutcome::Loaded { .. } => None,
        })
    }
}

/// Sums `bytes_sent` per region across every dataset under `summaries_dir`.
///
/// Datasets without a table are ignored. A table that cannot be parsed is
/// recorded as skipped and contributes nothing; the remaining datasets are
/// still loaded.
pub fn load_region_data(summaries_dir: &Path) -> Result<LoadReport, InputError> {
    if !summaries_dir.is_dir() {
        return Err(InputError::MissingInputDirectory(summaries_dir.to_path_buf()));
    }

    let entries = fs::read_dir(summaries_dir)
        .map_err(|_| InputError::MissingInputDirectory(summaries_dir.to_path_buf()))?;

    let dataset_dirs = collect_dataset_dirs(summaries_dir, entries.map(|e| e.map(|e| e.path())));

    info!("Scanning {} dataset directories in {:?}", dataset_dirs.len(), summaries_dir);

    let mut report = LoadReport::default();

    for dataset_dir in dataset_dirs {
        let table = dataset_dir.join(REGION_TABLE);
        if !table.is_file() {
            continue;
        }

        match read_region_table(&table) {
            Ok(rows) => {
                let row_count = rows.len();
                for (region, bytes_sent) in rows {
                    if PseudoRegion::from_region(&region).is_some() {
                        continue;
                    }
                    let total = report.totals.entry(region).or_insert(0);
                    *total = total.saturating_add(bytes_sent);
                }
                debug!("Loaded {} rows from {:?}", row_count, table);
                report.files.push((table, FileOutcome::Loaded { rows: row_count }));
            }
            Err(err) => {
                warn!("Skipping {:?}: {}", table, err);
                report.files.push((table, FileOutcome::Skipped(err)));
            }
        }
    }

    Ok(report)
}

// Directories only, sorted; entries that cannot be read are logged and left out.
fn collect_dataset_dirs(
    summaries_dir: &Path,
    entries: impl Iterator<Item = io::Result<PathBuf>>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => dirs.push(path),
            Ok(_) => {}
            Err(err) => warn!("Skipping unreadable entry in {:?}: {}", summaries_dir, err),
        }
    }
    dirs.sort();
    dirs
}

// Reads the whole table before any row is counted, so a bad file is all-or-nothing.
fn read_region_table(path: &Path) -> Result<Vec<(String, u64)>, InputError> {
    let file = File::open(path).map_err(|e| InputError::malformed(path, e))?;
    let mut rdr = ReaderBuilder::new().delimiter(b'\t').from_reader(file);
    let headers = rdr.headers().map_err(|e| InputError::malformed(path, e))?.clone();

    let region_idx = headers.iter().position(|h| h.trim() == REGION_COLUMN)
        .ok_or_else(|| InputError::malformed(path, format!("column '{}' not found", REGION_COLUMN)))?;
    let bytes_idx = headers.iter().position(|h| h.trim() == BYTES_COLUMN)
        .ok_or_else(|| InputError::malformed(path, format!("column '{}' not found", BYTES_COLUMN)))?;

    let mut rows = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| InputError::malformed(path, e))?;
        let region = record.get(region_idx).unwrap_or("").trim();
        if region.is_empty() {
            continue;
        }

        let raw_bytes = record.get(bytes_idx).unwrap_or("").trim();
        let bytes_sent: u64 = raw_bytes.parse().map_err(|e| {
            InputError::malformed(path, format!("row {}: invalid {} {:?}: {}", line + 1, BYTES_COLUMN, raw_bytes, e))
        })?;

        rows.push((region.to_string(), bytes_sent));
    }

    Ok(rows)
}
