use std::{
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use rayon::{ThreadPoolBuilder, prelude::*};
use walkdir::WalkDir;

use crate::{
    encoder::{OffspringPattern, RoleAssigner, plan_outputs},
    genotype::{Classifier, ClassifierConfig, Mode},
    specimen::{Specimen, aggregate},
    vcf::LocusTable,
};

/// Configuration required to drive a conversion.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub mode: Mode,
    pub classifier: ClassifierConfig,
    /// Colony fixed-width only: write maternal and offspring files separately.
    pub split_maternal_offspring: bool,
    pub offspring_pattern: OffspringPattern,
    pub output_dir: PathBuf,
}

impl ConversionConfig {
    pub fn new(mode: Mode, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            classifier: ClassifierConfig::default(),
            split_maternal_offspring: false,
            offspring_pattern: OffspringPattern::default(),
            output_dir: output_dir.into(),
        }
    }

    fn roles(&self) -> Option<&dyn RoleAssigner> {
        if self.split_maternal_offspring && self.mode == Mode::ColonyFixed {
            Some(&self.offspring_pattern)
        } else {
            None
        }
    }
}

/// Outcome of converting one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub loci: usize,
    pub specimens: usize,
    /// Specimens written to at least one output file.
    pub retained_specimens: usize,
    pub two_column_specimens: usize,
    /// Cells that classified to a missing value.
    pub missing_cells: usize,
}

impl ConversionSummary {
    fn record_specimens(&mut self, loci: usize, specimens: &[Specimen]) {
        self.specimens = specimens.len();
        self.loci = loci;
        for specimen in specimens {
            if specimen.needs_two_columns() {
                self.two_column_specimens += 1;
            }
            self.missing_cells += specimen
                .loci()
                .iter()
                .filter(|locus| !locus.is_informative())
                .count();
        }
    }
}

/// Outcome of a multi-file run, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<ConversionSummary>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: String,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Convert one VCF file into the output files of `config.mode`.
pub fn convert_file(input: &Path, config: &ConversionConfig) -> Result<ConversionSummary> {
    tracing::info!(
        mode = ?config.mode,
        input = %input.display(),
        output_dir = %config.output_dir.display(),
        "starting conversion",
    );

    let table = LocusTable::from_path(input)?;
    let classifier = Classifier::new(config.mode, config.classifier);
    let specimens = aggregate(&table, &classifier)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    let loci = table.loci();
    drop(table);

    let mut summary = ConversionSummary {
        input: input.to_path_buf(),
        ..Default::default()
    };
    summary.record_specimens(loci, &specimens);

    let stem = output_stem(input);
    let plans = plan_outputs(&specimens, loci, config.mode, &stem, config.roles());

    let mut retained = 0;
    for plan in &plans {
        if plan.specimens().is_empty() {
            tracing::warn!(
                file = plan.file_name(),
                "no specimens with called loci; writing an empty table"
            );
        }
        retained += plan.specimens().len();

        let path = config.output_dir.join(plan.file_name());
        let file = fs::File::create(&path)
            .with_context(|| format!("failed to create output {}", path.display()))?;
        plan.write_to(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
        summary.outputs.push(path);
    }
    summary.retained_specimens = retained;

    tracing::info!(
        input = %input.display(),
        loci = summary.loci,
        specimens = summary.specimens,
        retained = summary.retained_specimens,
        "finished conversion",
    );

    Ok(summary)
}

/// Convert every file in `inputs`, in parallel. A failing file is logged and
/// recorded without stopping the others.
pub fn convert_files(
    inputs: &[PathBuf],
    config: &ConversionConfig,
    threads: Option<usize>,
) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let run = || {
        inputs
            .par_iter()
            .map(|input| (input, convert_file(input, config)))
            .collect::<Vec<_>>()
    };

    let results = match threads {
        Some(threads) => ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("failed to build worker pool")?
            .install(run),
        None => run(),
    };

    let mut batch = BatchSummary::default();
    for (input, result) in results {
        match result {
            Ok(summary) => batch.converted.push(summary),
            Err(e) => {
                let error = format!("{e:#}");
                tracing::error!(input = %input.display(), error = %error, "conversion failed");
                batch.failures.push(FileFailure {
                    input: input.clone(),
                    error,
                });
            }
        }
    }

    Ok(batch)
}

/// Expand `path` into the list of files to convert.
///
/// A file is taken as-is. A directory contributes its direct children named
/// `*.vcf` or `*.vcf.gz`, sorted by name.
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(anyhow!("input {} does not exist", path.display()));
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to list {}", path.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".vcf") || name.ends_with(".vcf.gz") {
            inputs.push(entry.into_path());
        }
    }
    inputs.sort();

    if inputs.is_empty() {
        tracing::warn!(dir = %path.display(), "no .vcf or .vcf.gz files found");
    }
    Ok(inputs)
}

/// File name without a trailing `.gz` and its final extension.
pub fn output_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}
