//! Filtered rank computation over a full entity candidate pool.

use crate::dataset::MappedTriple;
use crate::embeddings::EmbeddingStore;
use crate::error::Result;
use crate::eval::ranks::{RankRecord, RankTally, RankType, Side};
use crate::models::ModelKind;
use std::collections::HashSet;

/// Computes filtered optimistic/pessimistic/realistic ranks for test triples.
///
/// For every test triple and each prediction side, all entities are scored
/// as the replacement candidate. Candidates that would form a known-true
/// triple (the filter set) are removed from the pool; the true answer itself
/// always stays in.
pub struct RankEvaluator<'a> {
    model: ModelKind,
    store: &'a EmbeddingStore,
    filter: HashSet<MappedTriple>,
    progress_interval: usize,
}

impl<'a> RankEvaluator<'a> {
    pub fn new(model: ModelKind, store: &'a EmbeddingStore) -> Self {
        Self {
            model,
            store,
            filter: HashSet::new(),
            progress_interval: 1000,
        }
    }

    /// Log a progress line every `interval` test triples.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Add known-true triples to the filter set. Call once per split
    /// (training, validation, test).
    pub fn add_filter_triples(&mut self, triples: impl IntoIterator<Item = MappedTriple>) {
        self.filter.extend(triples);
    }

    pub fn num_filter_triples(&self) -> usize {
        self.filter.len()
    }

    /// Rank every test triple on both sides.
    ///
    /// Returns six records per triple: head and tail side, three rank types
    /// each. The combined "both" view is derived later by the aggregator.
    pub fn evaluate(&self, test_triples: &[MappedTriple]) -> Result<Vec<RankRecord>> {
        let mut records = Vec::with_capacity(test_triples.len() * 6);

        for (i, &triple) in test_triples.iter().enumerate() {
            self.rank_side(triple, Side::Tail, &mut records)?;
            self.rank_side(triple, Side::Head, &mut records)?;

            if (i + 1) % self.progress_interval == 0 {
                log::info!(
                    "Ranked {}/{} test triples ({:.1}%)",
                    i + 1,
                    test_triples.len(),
                    (i + 1) as f64 / test_triples.len() as f64 * 100.0
                );
            }
        }

        Ok(records)
    }

    fn rank_side(
        &self,
        triple: MappedTriple,
        side: Side,
        records: &mut Vec<RankRecord>,
    ) -> Result<()> {
        let [head, relation, tail] = triple;
        let relation_emb = self.store.relation(relation)?;

        let (fixed_emb, truth) = match side {
            Side::Head => (self.store.entity(tail)?, head),
            Side::Tail => (self.store.entity(head)?, tail),
            Side::Both => unreachable!("both is derived, never ranked directly"),
        };
        let true_emb = self.store.entity(truth)?;

        let true_score = match side {
            Side::Head => self.model.score(true_emb, relation_emb, fixed_emb),
            _ => self.model.score(fixed_emb, relation_emb, true_emb),
        };

        let mut tally = RankTally::new();
        for candidate in 0..self.store.num_entities() as u32 {
            if candidate == truth {
                continue;
            }
            let replaced = match side {
                Side::Head => [candidate, relation, tail],
                _ => [head, relation, candidate],
            };
            if self.filter.contains(&replaced) {
                continue;
            }

            let candidate_emb = self.store.entity(candidate)?;
            let score = match side {
                Side::Head => self.model.score(candidate_emb, relation_emb, fixed_emb),
                _ => self.model.score(fixed_emb, relation_emb, candidate_emb),
            };
            tally.observe(score, true_score);
        }

        let ranks = tally.ranks();
        for rank_type in RankType::ALL {
            records.push(RankRecord {
                relation_id: relation,
                side,
                rank_type,
                rank: ranks.get(rank_type),
                num_candidates: ranks.num_candidates,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Three entities on a line, relation translating by +1 on x.
    /// TransE ranks are fully determined by distance.
    fn store() -> EmbeddingStore {
        EmbeddingStore::new(
            array![[0.0, 0.0], [1.0, 0.0], [5.0, 5.0]],
            array![[1.0, 0.0]],
        )
        .unwrap()
    }

    fn records_for(
        records: &[RankRecord],
        side: Side,
        rank_type: RankType,
    ) -> Vec<&RankRecord> {
        records
            .iter()
            .filter(|r| r.side == side && r.rank_type == rank_type)
            .collect()
    }

    #[test]
    fn perfect_tail_prediction_ranks_first() {
        let store = store();
        let evaluator = RankEvaluator::new(ModelKind::TransE, &store);

        // (0, r, 1): 0 + r lands exactly on entity 1.
        let records = evaluator.evaluate(&[[0, 0, 1]]).unwrap();
        assert_eq!(records.len(), 6);

        let tail = records_for(&records, Side::Tail, RankType::Realistic);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].rank, 1.0);
        assert_eq!(tail[0].num_candidates, 3);
        assert_eq!(tail[0].relation_id, 0);
    }

    #[test]
    fn filtered_candidates_shrink_the_pool() {
        let store = store();
        let mut evaluator = RankEvaluator::new(ModelKind::TransE, &store);
        // (0, r, 2) is known true, so entity 2 leaves the tail pool of (0, r, 1).
        evaluator.add_filter_triples([[0, 0, 2]]);

        let records = evaluator.evaluate(&[[0, 0, 1]]).unwrap();
        let tail = records_for(&records, Side::Tail, RankType::Realistic);
        assert_eq!(tail[0].num_candidates, 2);
        assert_eq!(tail[0].rank, 1.0);
    }

    #[test]
    fn truth_stays_in_pool_even_if_in_filter_set() {
        let store = store();
        let mut evaluator = RankEvaluator::new(ModelKind::TransE, &store);
        // The test triple itself is routinely part of the filter set.
        evaluator.add_filter_triples([[0, 0, 1]]);

        let records = evaluator.evaluate(&[[0, 0, 1]]).unwrap();
        let tail = records_for(&records, Side::Tail, RankType::Realistic);
        assert_eq!(tail[0].num_candidates, 3);
    }

    #[test]
    fn head_and_tail_sides_are_ranked_independently() {
        let store = store();
        let evaluator = RankEvaluator::new(ModelKind::TransE, &store);

        let records = evaluator.evaluate(&[[0, 0, 1]]).unwrap();
        assert_eq!(records_for(&records, Side::Head, RankType::Optimistic).len(), 1);
        assert_eq!(records_for(&records, Side::Tail, RankType::Optimistic).len(), 1);
        assert!(records_for(&records, Side::Both, RankType::Optimistic).is_empty());
    }

    #[test]
    fn out_of_range_id_errors() {
        let store = store();
        let evaluator = RankEvaluator::new(ModelKind::TransE, &store);
        assert!(evaluator.evaluate(&[[0, 0, 99]]).is_err());
    }
}
