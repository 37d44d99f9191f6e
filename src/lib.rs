#![doc = include_str!("../README.md")]

pub mod cli;
pub mod conversion;
pub mod encoder;
pub mod genotype;
pub mod report;
pub mod smart_reader;
pub mod specimen;
pub mod vcf;

pub use conversion::{
    BatchSummary, ConversionConfig, ConversionSummary, convert_file, convert_files,
    discover_inputs,
};
pub use genotype::{ClassifiedLocus, Classifier, ClassifierConfig, Depth, Mode, classify};
pub use specimen::{Specimen, aggregate};
pub use vcf::LocusTable;
