use convert_vcf::{
    ClassifiedLocus, ClassifierConfig, LocusTable, Mode, aggregate, classify,
    encoder::plan_outputs, genotype::Classifier,
};
use proptest::prelude::*;

fn depth_list() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u32..200, 1..6).prop_map(|depths| {
        depths
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    })
}

fn allele() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['0', '1', '2', '3'])
}

fn field() -> impl Strategy<Value = String> {
    (allele(), allele(), prop::bool::ANY, depth_list()).prop_map(|(a, b, missing, depths)| {
        if missing {
            format!("./.:0:{depths}")
        } else {
            format!("{a}/{b}:9:{depths}")
        }
    })
}

fn any_mode() -> impl Strategy<Value = Mode> {
    prop::sample::select(vec![Mode::Had, Mode::ColonyFixed, Mode::ColonyVariable])
}

proptest! {
    #[test]
    fn homozygous_calls_are_missing_in_had(
        a in allele(),
        depths in "[0-9a-z,]{0,12}",
        remove_double_hets in prop::bool::ANY,
    ) {
        let field = format!("{a}/{a}:9:{depths}");
        let config = ClassifierConfig { remove_double_hets };
        prop_assert_eq!(classify(&field, Mode::Had, config).unwrap(), ClassifiedLocus::Missing);
    }

    #[test]
    fn missing_calls_in_colony_modes(suffix in "[:0-9,]{0,10}") {
        let field = format!("./.{suffix}");
        let config = ClassifierConfig::default();
        prop_assert_eq!(
            classify(&field, Mode::ColonyFixed, config).unwrap(),
            ClassifiedLocus::AlleleCallPair(0, 0)
        );
        prop_assert_eq!(
            classify(&field, Mode::ColonyVariable, config).unwrap(),
            ClassifiedLocus::MissingSingle
        );
    }

    #[test]
    fn classification_is_pure(field in field(), mode in any_mode(), remove_double_hets in prop::bool::ANY) {
        let classifier = Classifier::new(mode, ClassifierConfig { remove_double_hets });
        prop_assert_eq!(classifier.classify(&field), classifier.classify(&field));
    }

    #[test]
    fn three_positive_depths_take_two_smallest(depths in proptest::collection::vec(1u32..10_000, 3)) {
        let field = format!("0/1:99:{},{},{}", depths[0], depths[1], depths[2]);

        let strict = ClassifierConfig { remove_double_hets: true };
        prop_assert_eq!(classify(&field, Mode::Had, strict).unwrap(), ClassifiedLocus::Missing);

        let mut sorted = depths.clone();
        sorted.sort_unstable();
        prop_assert_eq!(
            classify(&field, Mode::Had, ClassifierConfig::default()).unwrap(),
            ClassifiedLocus::DepthPair(
                sorted[0].to_string().parse().unwrap(),
                sorted[1].to_string().parse().unwrap(),
            )
        );
    }

    #[test]
    fn classifier_never_panics(field in "\\PC{0,24}", mode in any_mode()) {
        let _ = classify(&field, mode, ClassifierConfig::default());
    }

    #[test]
    fn header_round_trips_names_and_widths(
        columns in proptest::collection::vec(proptest::collection::vec(field(), 4), 1..6),
        mode in any_mode(),
    ) {
        let names: Vec<String> = (0..columns.len()).map(|i| format!("s{i}")).collect();
        let loci = columns[0].len();
        let mut rows = vec![names.clone()];
        for locus in 0..loci {
            rows.push(columns.iter().map(|c| c[locus].clone()).collect());
        }
        let table = LocusTable::from_rows(rows);
        let classifier = Classifier::new(mode, ClassifierConfig::default());
        let specimens = aggregate(&table, &classifier).unwrap();

        for plan in plan_outputs(&specimens, table.loci(), mode, "p", None) {
            let mut buf = Vec::new();
            plan.write_to(&mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            let header = text.lines().next().unwrap_or_default();

            let mut expected = Vec::new();
            for specimen in plan.specimens() {
                let width = if mode == Mode::ColonyVariable && !specimen.needs_two_columns() { 1 } else { 2 };
                for _ in 0..width {
                    expected.push(specimen.name());
                }
            }
            let parsed: Vec<&str> = if header.is_empty() { Vec::new() } else { header.split('\t').collect() };
            prop_assert_eq!(parsed, expected);
            prop_assert_eq!(text.lines().count(), loci + 1);

            let retained: Vec<&str> = plan.specimens().iter().map(|s| s.name()).collect();
            let original: Vec<&str> = names.iter().map(String::as_str).filter(|n| retained.contains(n)).collect();
            prop_assert_eq!(retained, original);
        }
    }
}
