//! Interpretation of a single raw VCF sample field.
//!
//! A field looks like `0/1:15:10,5,0`: the allele calls sit at character
//! positions 0 and 2 of the first subfield and the per-allele read depths are
//! the comma-separated list in the subfield at index 2. Each output layout
//! reads a different part of it, so classification is dispatched through a
//! [`Classifier`] chosen once per conversion run.

use std::{cmp::Ordering, fmt, str::FromStr};

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

/// Single-column missing marker used by the variable-width Colony layout.
pub const MISSING_SINGLE: i32 = -9;

/// Target layout of a conversion run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Heterozygous allele depth table.
    Had,
    /// Colony allele calls, always two columns per specimen.
    ColonyFixed,
    /// Colony allele calls, one column for specimens without heterozygous calls.
    ColonyVariable,
}

impl Mode {
    /// Whether every specimen occupies two columns regardless of its data.
    pub fn is_fixed_width(self) -> bool {
        matches!(self, Mode::Had | Mode::ColonyFixed)
    }
}

/// Mode-specific knobs for classification.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ClassifierConfig {
    /// HAD only: treat loci with more than two supported alleles as missing.
    pub remove_double_hets: bool,
}

/// One read-depth token, kept exactly as written in the source field.
///
/// Ordering and positivity follow the numeric magnitude, so `007` sorts as 7
/// but is still rendered as `007`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Depth(String);

impl Depth {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Significant decimal digits, without sign or leading zeros.
    fn magnitude(&self) -> &str {
        let digits = self.0.strip_prefix('+').unwrap_or(&self.0);
        digits.trim_start_matches('0')
    }

    pub fn is_positive(&self) -> bool {
        !self.magnitude().is_empty()
    }
}

impl FromStr for Depth {
    type Err = MalformedFieldKind;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let digits = token.strip_prefix('+').unwrap_or(token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MalformedFieldKind::InvalidDepth(token.to_string()));
        }
        Ok(Depth(token.to_string()))
    }
}

impl Ord for Depth {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.magnitude(), other.magnitude());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Depth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized value of one locus for one specimen.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ClassifiedLocus {
    /// No usable genotype information (HAD).
    Missing,
    /// Read depths of the two alleles supporting a heterozygous call.
    DepthPair(Depth, Depth),
    /// Two 1-based allele indices. `(0, 0)` marks a missing call in the
    /// fixed-width Colony layout.
    AlleleCallPair(u32, u32),
    /// One 1-based allele index for a homozygous call (variable-width Colony).
    AlleleCallSingle(u32),
    /// Missing call in the variable-width Colony layout.
    MissingSingle,
}

impl ClassifiedLocus {
    /// Whether the value needs two output columns.
    pub fn is_two_column(&self) -> bool {
        matches!(
            self,
            ClassifiedLocus::DepthPair(..) | ClassifiedLocus::AlleleCallPair(..)
        )
    }

    /// Whether the value carries any genotype information.
    pub fn is_informative(&self) -> bool {
        !matches!(
            self,
            ClassifiedLocus::Missing
                | ClassifiedLocus::MissingSingle
                | ClassifiedLocus::AlleleCallPair(0, 0)
        )
    }
}

/// A raw field that does not have the expected genotype/depth structure.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("malformed genotype field '{field}': {kind}")]
pub struct MalformedFieldError {
    pub field: String,
    #[source]
    pub kind: MalformedFieldKind,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum MalformedFieldKind {
    #[error("expected at least three characters of genotype call")]
    TooShort,
    #[error("missing allele depth subfield")]
    MissingDepthSubfield,
    #[error("invalid allele depth '{0}'")]
    InvalidDepth(String),
    #[error("invalid allele index '{0}'")]
    InvalidAllele(char),
}

/// Classification strategy for one conversion run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Classifier {
    Had { remove_double_hets: bool },
    ColonyFixed,
    ColonyVariable,
}

impl Classifier {
    pub fn new(mode: Mode, config: ClassifierConfig) -> Self {
        match mode {
            Mode::Had => Classifier::Had {
                remove_double_hets: config.remove_double_hets,
            },
            Mode::ColonyFixed => Classifier::ColonyFixed,
            Mode::ColonyVariable => Classifier::ColonyVariable,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Classifier::Had { .. } => Mode::Had,
            Classifier::ColonyFixed => Mode::ColonyFixed,
            Classifier::ColonyVariable => Mode::ColonyVariable,
        }
    }

    pub fn classify(&self, field: &str) -> Result<ClassifiedLocus, MalformedFieldError> {
        let result = match *self {
            Classifier::Had { remove_double_hets } => classify_depths(field, remove_double_hets),
            Classifier::ColonyFixed => classify_fixed(field),
            Classifier::ColonyVariable => classify_variable(field),
        };

        result.map_err(|kind| MalformedFieldError {
            field: field.to_string(),
            kind,
        })
    }
}

/// Classify `field` under `mode`.
///
/// Convenience wrapper around [`Classifier::classify`] for one-off calls; the
/// aggregation loop builds the [`Classifier`] once instead.
pub fn classify(
    field: &str,
    mode: Mode,
    config: ClassifierConfig,
) -> Result<ClassifiedLocus, MalformedFieldError> {
    Classifier::new(mode, config).classify(field)
}

fn allele_chars(field: &str) -> Result<(char, char), MalformedFieldKind> {
    let mut chars = field.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(first), Some(_), Some(second)) => Ok((first, second)),
        _ => Err(MalformedFieldKind::TooShort),
    }
}

fn is_missing_call(field: &str) -> bool {
    matches!(field.get(0..3), Some("./.") | Some(".|."))
}

fn allele_index(c: char) -> Result<u32, MalformedFieldKind> {
    c.to_digit(10)
        .map(|index| index + 1)
        .ok_or(MalformedFieldKind::InvalidAllele(c))
}

fn depth_subfield(field: &str) -> Result<&str, MalformedFieldKind> {
    let subfields: Vec<&str> = field.split(':').collect();
    match subfields.len() {
        0 | 1 => Err(MalformedFieldKind::MissingDepthSubfield),
        // GT:AD without the DP column
        2 => Ok(subfields[1]),
        _ => Ok(subfields[2]),
    }
}

fn classify_depths(
    field: &str,
    remove_double_hets: bool,
) -> Result<ClassifiedLocus, MalformedFieldKind> {
    let (first, second) = allele_chars(field)?;
    if first == second {
        return Ok(ClassifiedLocus::Missing);
    }

    let mut nonzero = Vec::with_capacity(2);
    for token in depth_subfield(field)?.split(',') {
        let depth: Depth = token.parse()?;
        if depth.is_positive() {
            nonzero.push(depth);
        }
    }

    let locus = match nonzero.len() {
        // Declared heterozygote without two supported alleles.
        0 | 1 => ClassifiedLocus::Missing,
        2 => two_depths(nonzero),
        _ if remove_double_hets => ClassifiedLocus::Missing,
        _ => {
            nonzero.sort_unstable();
            two_depths(nonzero)
        }
    };
    Ok(locus)
}

fn two_depths(depths: Vec<Depth>) -> ClassifiedLocus {
    let mut depths = depths.into_iter();
    match (depths.next(), depths.next()) {
        (Some(first), Some(second)) => ClassifiedLocus::DepthPair(first, second),
        _ => ClassifiedLocus::Missing,
    }
}

fn classify_fixed(field: &str) -> Result<ClassifiedLocus, MalformedFieldKind> {
    if is_missing_call(field) {
        return Ok(ClassifiedLocus::AlleleCallPair(0, 0));
    }
    let (first, second) = allele_chars(field)?;
    Ok(ClassifiedLocus::AlleleCallPair(
        allele_index(first)?,
        allele_index(second)?,
    ))
}

fn classify_variable(field: &str) -> Result<ClassifiedLocus, MalformedFieldKind> {
    let (first, second) = allele_chars(field)?;
    if first != second {
        return Ok(ClassifiedLocus::AlleleCallPair(
            allele_index(first)?,
            allele_index(second)?,
        ));
    }
    if is_missing_call(field) {
        return Ok(ClassifiedLocus::MissingSingle);
    }
    Ok(ClassifiedLocus::AlleleCallSingle(allele_index(first)?))
}
