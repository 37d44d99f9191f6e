//! Structured run report for downstream tool consumption.
//!
//! Records the options of a batch run together with per-file statistics and
//! failures, serialized as pretty-printed JSON.

use serde::Serialize;
use std::path::Path;

use crate::conversion::{BatchSummary, ConversionConfig, ConversionSummary, FileFailure};
use crate::genotype::Mode;

/// Complete report of a conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Tool version
    pub version: String,
    /// Timestamp of run (RFC 3339)
    pub timestamp: String,
    pub options: Options,
    pub files: Vec<FileStatistics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Options {
    pub mode: Mode,
    pub remove_double_hets: bool,
    pub split_maternal_offspring: bool,
    pub offspring_pattern: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileStatistics {
    pub input: String,
    pub outputs: Vec<String>,
    pub loci: usize,
    pub specimens: usize,
    pub retained_specimens: usize,
    pub two_column_specimens: usize,
    pub missing_cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub input: String,
    pub error: String,
}

impl From<&ConversionConfig> for Options {
    fn from(config: &ConversionConfig) -> Self {
        Options {
            mode: config.mode,
            remove_double_hets: config.classifier.remove_double_hets,
            split_maternal_offspring: config.split_maternal_offspring,
            offspring_pattern: config.offspring_pattern.to_string(),
            output_dir: config.output_dir.display().to_string(),
        }
    }
}

impl From<&ConversionSummary> for FileStatistics {
    fn from(s: &ConversionSummary) -> Self {
        FileStatistics {
            input: s.input.display().to_string(),
            outputs: s.outputs.iter().map(|p| p.display().to_string()).collect(),
            loci: s.loci,
            specimens: s.specimens,
            retained_specimens: s.retained_specimens,
            two_column_specimens: s.two_column_specimens,
            missing_cells: s.missing_cells,
        }
    }
}

impl From<&FileFailure> for Failure {
    fn from(f: &FileFailure) -> Self {
        Failure {
            input: f.input.display().to_string(),
            error: f.error.clone(),
        }
    }
}

impl RunReport {
    pub fn new(config: &ConversionConfig, batch: &BatchSummary) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let timestamp = now
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        RunReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            options: Options::from(config),
            files: batch.converted.iter().map(FileStatistics::from).collect(),
            failures: batch.failures.iter().map(Failure::from).collect(),
        }
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        tracing::info!("Wrote run report to {}", path.display());
        Ok(())
    }
}
