use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    BatchSummary, ConversionConfig, convert_files, discover_inputs,
    encoder::{DEFAULT_OFFSPRING_PATTERN, OffspringPattern},
    genotype::{ClassifierConfig, Mode},
    report::RunReport,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert VCF files to HAD or Colony genotype tables", long_about = None)]
struct Cli {
    /// Input VCF file, or a directory whose .vcf/.vcf.gz files are all converted
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output table layout
    #[arg(long, value_enum)]
    mode: Mode,

    /// Directory receiving the converted files
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// HAD only: report loci with more than two supported alleles as missing
    #[arg(long)]
    remove_double_hets: bool,

    /// Colony fixed-width only: write maternal and offspring specimens to separate files
    #[arg(long)]
    split_maternal_offspring: bool,

    /// Regular expression marking a specimen name as offspring
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_OFFSPRING_PATTERN)]
    offspring_pattern: OffspringPattern,

    /// Number of files converted in parallel (defaults to one per CPU)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Logging verbosity (e.g. error, warn, info, debug)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> ConversionConfig {
        if self.remove_double_hets && self.mode != Mode::Had {
            tracing::warn!("--remove-double-hets only applies to --mode had; ignoring");
        }
        if self.split_maternal_offspring && self.mode != Mode::ColonyFixed {
            tracing::warn!("--split-maternal-offspring only applies to --mode colony-fixed; ignoring");
        }

        ConversionConfig {
            mode: self.mode,
            classifier: ClassifierConfig {
                remove_double_hets: self.remove_double_hets,
            },
            split_maternal_offspring: self.split_maternal_offspring,
            offspring_pattern: self.offspring_pattern.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = cli.config();
    let inputs = discover_inputs(&cli.input)?;
    let batch = convert_files(&inputs, &config, cli.threads)?;
    print_summary(&batch);

    if let Some(path) = &cli.report {
        RunReport::new(&config, &batch)
            .write(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    if !batch.is_success() {
        anyhow::bail!(
            "{failed} of {total} files failed to convert",
            failed = batch.failures.len(),
            total = inputs.len()
        );
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
    Ok(())
}

fn print_summary(batch: &BatchSummary) {
    for summary in &batch.converted {
        println!(
            "Converted {input}: {loci} loci, {retained}/{specimens} specimens written to {outputs}.",
            input = summary.input.display(),
            loci = summary.loci,
            retained = summary.retained_specimens,
            specimens = summary.specimens,
            outputs = summary
                .outputs
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    for failure in &batch.failures {
        println!(
            "Failed {input}: {error}",
            input = failure.input.display(),
            error = failure.error
        );
    }

    if batch.converted.is_empty() && batch.failures.is_empty() {
        println!("No input files found.");
    }
}
