//! Per-specimen aggregation of classified loci.

use thiserror::Error;

use crate::genotype::{ClassifiedLocus, Classifier, MalformedFieldError};
use crate::vcf::LocusTable;

/// One sampled individual and its classified value at every locus.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Specimen {
    name: String,
    loci: Vec<ClassifiedLocus>,
    needs_two_columns: bool,
    has_informative_data: bool,
}

impl Specimen {
    /// Build a specimen from already classified loci. `fixed_width` forces the
    /// two-column flag, as for the HAD and fixed-width Colony layouts.
    pub fn from_loci<N, I>(name: N, loci: I, fixed_width: bool) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = ClassifiedLocus>,
    {
        loci.into_iter()
            .fold(Self::empty(name.into(), fixed_width, 0), Self::with_locus)
    }

    fn empty(name: String, fixed_width: bool, capacity: usize) -> Self {
        Self {
            name,
            loci: Vec::with_capacity(capacity),
            needs_two_columns: fixed_width,
            has_informative_data: false,
        }
    }

    fn with_locus(mut self, locus: ClassifiedLocus) -> Self {
        self.needs_two_columns |= locus.is_two_column();
        self.has_informative_data |= locus.is_informative();
        self.loci.push(locus);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn loci(&self) -> &[ClassifiedLocus] {
        &self.loci
    }

    /// Whether any locus produced a two-element value.
    pub fn needs_two_columns(&self) -> bool {
        self.needs_two_columns
    }

    /// Whether any locus produced a non-missing value.
    pub fn has_informative_data(&self) -> bool {
        self.has_informative_data
    }
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("table has no data rows")]
    EmptyTable,
    #[error("data row {row} has {found} columns, header has {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("locus {locus}, specimen '{specimen}': {source}")]
    MalformedField {
        locus: usize,
        specimen: String,
        #[source]
        source: MalformedFieldError,
    },
}

/// Classify every cell of `table` and collect the results per specimen, in
/// header order. Loci are numbered from 1 in errors.
pub fn aggregate(
    table: &LocusTable,
    classifier: &Classifier,
) -> Result<Vec<Specimen>, AggregateError> {
    if table.loci() == 0 {
        return Err(AggregateError::EmptyTable);
    }

    let header = table.header();
    let fixed_width = classifier.mode().is_fixed_width();
    let specimens: Vec<Specimen> = header
        .iter()
        .map(|name| Specimen::empty(name.clone(), fixed_width, table.loci()))
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .try_fold(specimens, |specimens, (index, row)| {
            let locus = index + 1;
            if row.len() != header.len() {
                return Err(AggregateError::ColumnMismatch {
                    row: locus,
                    expected: header.len(),
                    found: row.len(),
                });
            }

            specimens
                .into_iter()
                .zip(row)
                .map(|(specimen, field)| match classifier.classify(field) {
                    Ok(value) => Ok(specimen.with_locus(value)),
                    Err(source) => Err(AggregateError::MalformedField {
                        locus,
                        specimen: specimen.name,
                        source,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::{ClassifierConfig, Mode};

    fn classifier(mode: Mode) -> Classifier {
        Classifier::new(mode, ClassifierConfig::default())
    }

    fn depths(first: &str, second: &str) -> ClassifiedLocus {
        ClassifiedLocus::DepthPair(first.parse().unwrap(), second.parse().unwrap())
    }

    #[test]
    fn aggregates_in_header_order() {
        let table = LocusTable::from_rows([
            vec!["b", "a"],
            vec!["0/1:15:10,5,0", "1/1:8:0,0,8"],
            vec!["0/0:3:3,0", "0/1:9:4,5"],
        ]);
        let specimens = aggregate(&table, &classifier(Mode::Had)).unwrap();

        assert_eq!(specimens.len(), 2);
        assert_eq!(specimens[0].name(), "b");
        assert_eq!(
            specimens[0].loci(),
            [depths("10", "5"), ClassifiedLocus::Missing]
        );
        assert_eq!(specimens[1].name(), "a");
        assert_eq!(
            specimens[1].loci(),
            [ClassifiedLocus::Missing, depths("4", "5")]
        );
        assert!(specimens.iter().all(Specimen::needs_two_columns));
    }

    #[test]
    fn all_missing_specimen_is_not_informative() {
        let table = LocusTable::from_rows([
            vec!["10a", "11a"],
            vec!["./.:0:0,0", "0/0:4:4,0"],
            vec!["./.", "./."],
        ]);
        let specimens = aggregate(&table, &classifier(Mode::ColonyFixed)).unwrap();

        assert!(!specimens[0].has_informative_data());
        assert!(specimens[1].has_informative_data());
        assert_eq!(
            specimens[1].loci(),
            [
                ClassifiedLocus::AlleleCallPair(1, 1),
                ClassifiedLocus::AlleleCallPair(0, 0)
            ]
        );
    }

    #[test]
    fn variable_width_flags_follow_heterozygous_calls() {
        let table = LocusTable::from_rows([
            vec!["hom", "het", "gone"],
            vec!["1/1", "1/1", "./."],
            vec!["0/0", "0/1", "./."],
        ]);
        let specimens = aggregate(&table, &classifier(Mode::ColonyVariable)).unwrap();

        assert!(!specimens[0].needs_two_columns());
        assert!(specimens[0].has_informative_data());
        assert!(specimens[1].needs_two_columns());
        assert_eq!(specimens[1].loci()[1], ClassifiedLocus::AlleleCallPair(1, 2));
        assert!(!specimens[2].needs_two_columns());
        assert!(!specimens[2].has_informative_data());
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = LocusTable::from_rows([vec!["a", "b"]]);
        let err = aggregate(&table, &classifier(Mode::Had)).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyTable));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let table = LocusTable::from_rows([vec!["a", "b"], vec!["0/1", "0/1"], vec!["0/1"]]);
        let err = aggregate(&table, &classifier(Mode::ColonyFixed)).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::ColumnMismatch {
                row: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn malformed_field_reports_coordinates() {
        let table = LocusTable::from_rows([vec!["a", "b"], vec!["0/1:3:1,2", "0/1:3:1,?"]]);
        let err = aggregate(&table, &classifier(Mode::Had)).unwrap_err();
        match err {
            AggregateError::MalformedField {
                locus, specimen, ..
            } => {
                assert_eq!(locus, 1);
                assert_eq!(specimen, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_loci_folds_flags() {
        let specimen = Specimen::from_loci(
            "x",
            [
                ClassifiedLocus::MissingSingle,
                ClassifiedLocus::AlleleCallSingle(2),
            ],
            false,
        );
        assert!(specimen.has_informative_data());
        assert!(!specimen.needs_two_columns());

        let fixed = Specimen::from_loci("y", [ClassifiedLocus::Missing], true);
        assert!(fixed.needs_two_columns());
        assert!(!fixed.has_informative_data());
    }
}
