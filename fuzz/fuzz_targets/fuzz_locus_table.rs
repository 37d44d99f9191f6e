#![no_main]

use convert_vcf::{ClassifierConfig, LocusTable, Mode, aggregate, genotype::Classifier};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Non-UTF-8 input is a read error, not a panic
    let Ok(table) = LocusTable::read(data) else {
        return;
    };

    let classifier = Classifier::new(Mode::ColonyVariable, ClassifierConfig::default());
    if let Ok(specimens) = aggregate(&table, &classifier) {
        for specimen in &specimens {
            assert_eq!(specimen.loci().len(), table.loci());
        }
    }
});
