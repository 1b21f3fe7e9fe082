//! Predicate frequency statistics over a triple split.

use crate::dataset::Triple;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Usage counts of one predicate within a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateFrequency {
    pub predicate: String,
    pub triples: u64,
    pub distinct_subjects: u64,
    pub distinct_objects: u64,
}

/// Count triples and distinct subjects/objects per predicate.
///
/// Sorted by triple count descending, predicate label ascending on ties.
pub fn predicate_frequencies(triples: &[Triple]) -> Vec<PredicateFrequency> {
    struct Tally<'a> {
        triples: u64,
        subjects: HashSet<&'a str>,
        objects: HashSet<&'a str>,
    }

    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for triple in triples {
        let tally = tallies.entry(&triple.predicate).or_insert_with(|| Tally {
            triples: 0,
            subjects: HashSet::new(),
            objects: HashSet::new(),
        });
        tally.triples += 1;
        tally.subjects.insert(&triple.subject);
        tally.objects.insert(&triple.object);
    }

    let mut frequencies: Vec<PredicateFrequency> = tallies
        .into_iter()
        .map(|(predicate, tally)| PredicateFrequency {
            predicate: predicate.to_string(),
            triples: tally.triples,
            distinct_subjects: tally.subjects.len() as u64,
            distinct_objects: tally.objects.len() as u64,
        })
        .collect();

    frequencies.sort_by(|a, b| {
        b.triples
            .cmp(&a.triples)
            .then_with(|| a.predicate.cmp(&b.predicate))
    });
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_triples_and_distinct_entities() {
        let triples = vec![
            Triple::new("Q1", "P31", "Q5"),
            Triple::new("Q2", "P31", "Q5"),
            Triple::new("Q1", "P31", "Q6"),
            Triple::new("Q1", "P279", "Q7"),
        ];

        let frequencies = predicate_frequencies(&triples);
        assert_eq!(frequencies.len(), 2);

        let p31 = &frequencies[0];
        assert_eq!(p31.predicate, "P31");
        assert_eq!(p31.triples, 3);
        assert_eq!(p31.distinct_subjects, 2);
        assert_eq!(p31.distinct_objects, 2);

        assert_eq!(frequencies[1].predicate, "P279");
        assert_eq!(frequencies[1].triples, 1);
    }

    #[test]
    fn sorted_by_count_then_label() {
        let triples = vec![
            Triple::new("Q1", "P2", "Q2"),
            Triple::new("Q1", "P1", "Q2"),
        ];
        let frequencies = predicate_frequencies(&triples);
        assert_eq!(frequencies[0].predicate, "P1");
        assert_eq!(frequencies[1].predicate, "P2");
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(predicate_frequencies(&[]).is_empty());
    }
}
