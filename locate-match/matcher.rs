use locate_brief::hamming_distance;
use locate_core::{Descriptor, Match};
use log::debug;
use rayon::prelude::*;

use crate::error::{MatchError, MatchResult};
use crate::MatcherConfig;

/// Exhaustive Hamming matcher
#[derive(Debug, Clone)]
pub struct BruteForceMatcher {
    cfg: MatcherConfig,
}

impl BruteForceMatcher {
    pub fn new(cfg: MatcherConfig) -> MatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// The `k` nearest train descriptors of every query descriptor.
    ///
    /// Each inner list is sorted by ascending distance, equal distances by
    /// ascending train index, and holds `min(k, train.len())` matches.
    /// Outer order is query order.
    pub fn knn_match(
        &self,
        query: &[Descriptor],
        train: &[Descriptor],
        k: usize,
    ) -> MatchResult<Vec<Vec<Match>>> {
        if k == 0 {
            return Err(MatchError::InvalidK);
        }
        Ok(query
            .par_iter()
            .enumerate()
            .map(|(query_idx, q)| nearest(query_idx, q, train, k))
            .collect())
    }

    /// Ratio-tested nearest neighbours, in query order.
    ///
    /// Fewer than two train descriptors leave no second neighbour to compare
    /// with, so the result is empty.
    pub fn match_descriptors(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<Match> {
        if train.len() < 2 {
            debug!("matcher: {} train descriptors, nothing to match", train.len());
            return Vec::new();
        }

        let ratio = self.cfg.ratio;
        let mut matches: Vec<Match> = query
            .par_iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                let knn = nearest(query_idx, q, train, 2);
                let (best, second) = (knn[0], knn[1]);
                ((best.distance as f32) < ratio * second.distance as f32).then_some(best)
            })
            .collect();
        let accepted = matches.len();

        if self.cfg.cross_check {
            let reverse: Vec<usize> = train
                .par_iter()
                .map(|t| {
                    query
                        .iter()
                        .enumerate()
                        .min_by_key(|&(i, q)| (hamming_distance(t, q), i))
                        .map_or(usize::MAX, |(i, _)| i)
                })
                .collect();
            matches.retain(|m| reverse[m.train_idx] == m.query_idx);
        }

        debug!(
            "matcher: {} query, {} train, {} passed ratio {:.2}, {} kept",
            query.len(),
            train.len(),
            accepted,
            ratio,
            matches.len()
        );
        matches
    }
}

/// Match with an explicit configuration
pub fn match_descriptors(
    query: &[Descriptor],
    train: &[Descriptor],
    cfg: MatcherConfig,
) -> MatchResult<Vec<Match>> {
    Ok(BruteForceMatcher::new(cfg)?.match_descriptors(query, train))
}

/// Insertion into a sorted list of at most `k` candidates
fn nearest(query_idx: usize, q: &Descriptor, train: &[Descriptor], k: usize) -> Vec<Match> {
    let mut best: Vec<Match> = Vec::with_capacity(k + 1);
    for (train_idx, t) in train.iter().enumerate() {
        let distance = hamming_distance(q, t);
        if best.len() == k && distance >= best[k - 1].distance {
            continue;
        }
        // earlier train indices stay ahead of equal distances
        let pos = best.partition_point(|m| m.distance <= distance);
        best.insert(
            pos,
            Match {
                query_idx,
                train_idx,
                distance,
            },
        );
        best.truncate(k);
    }
    best
}
