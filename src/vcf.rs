//! Reading VCF text into a [`LocusTable`].
//!
//! Only the sample columns are kept: leading `##` meta lines are skipped and
//! the nine positional columns (`#CHROM` through `FORMAT`) are dropped from
//! every remaining line, so row 0 holds specimen names and each later row one
//! raw genotype field per specimen.

use std::{
    io::{self, BufRead},
    path::Path,
};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::smart_reader;

/// Number of positional columns preceding the sample columns.
pub const FIXED_COLUMNS: usize = 9;

/// Header row of specimen names plus one row of raw fields per locus.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct LocusTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Error)]
#[error("line {line}: failed to read VCF text")]
pub struct TableError {
    pub line: u64,
    #[source]
    pub source: io::Error,
}

impl LocusTable {
    /// Build a table from already split rows, the first of which is the header.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>());
        let header = rows.next().unwrap_or_default();
        Self {
            header,
            rows: rows.collect(),
        }
    }

    pub fn read<R>(reader: R) -> Result<Self, TableError>
    where
        R: BufRead,
    {
        let mut lines = Vec::new();
        let mut in_meta = true;

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TableError {
                line: index as u64 + 1,
                source,
            })?;

            if in_meta && line.starts_with("##") {
                continue;
            }
            in_meta = false;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            lines.push(sample_columns(trimmed));
        }

        Ok(Self::from_rows(lines))
    }

    /// Open `path`, decompressing gzip/BGZF input transparently.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = smart_reader::open_input(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::read(reader).with_context(|| format!("failed to read {}", path.display()))
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows, excluding the header.
    pub fn loci(&self) -> usize {
        self.rows.len()
    }
}

fn sample_columns(line: &str) -> Vec<String> {
    line.split('\t')
        .skip(FIXED_COLUMNS)
        .map(str::to_string)
        .collect()
}
