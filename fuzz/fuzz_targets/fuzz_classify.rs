#![no_main]

use convert_vcf::{ClassifiedLocus, ClassifierConfig, Mode, classify};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    for mode in [Mode::Had, Mode::ColonyFixed, Mode::ColonyVariable] {
        for remove_double_hets in [false, true] {
            let config = ClassifierConfig { remove_double_hets };
            // Must never panic; errors are expected for random input
            let Ok(locus) = classify(&input, mode, config) else {
                continue;
            };

            // Allele indices are 1-based single digits, or the 0 missing sentinel
            match locus {
                ClassifiedLocus::AlleleCallPair(a, b) => assert!(a <= 10 && b <= 10),
                ClassifiedLocus::AlleleCallSingle(a) => assert!((1..=10).contains(&a)),
                ClassifiedLocus::DepthPair(a, b) => assert!(a.is_positive() && b.is_positive()),
                ClassifiedLocus::Missing | ClassifiedLocus::MissingSingle => {}
            }
        }
    }
});
