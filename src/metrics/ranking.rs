//! @ai:module:intent Rank technique versions by their mean position across scenes, sample counts and metrics
//! @ai:module:layer application
//! @ai:module:public_api rank_versions
//! @ai:module:stateless true

use crate::metrics::types::{Metric, RankEntry, Ranking};
use crate::model::{SceneId, TechniqueSet, VersionId};
use std::collections::BTreeSet;

/// @ai:intent Sample counts for which every selected version has at least one result
/// @ai:effects pure
pub fn common_sample_counts(set: &TechniqueSet, versions: &[VersionId]) -> BTreeSet<u32> {
    let mut iter = versions.iter().map(|v| set.sample_counts(*v, None));
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    iter.fold(first, |acc, counts| acc.intersection(&counts).copied().collect())
}

/// @ai:intent Rank versions: each (scene, spp, metric) combination awards positions 1..k to the versions with a value
/// @ai:effects pure
pub fn rank_versions(
    set: &TechniqueSet,
    versions: &[VersionId],
    scenes: &[SceneId],
    metrics: &[Metric],
) -> Ranking {
    let versions: Vec<VersionId> = versions
        .iter()
        .copied()
        .filter(|id| set.version(*id).is_some())
        .collect();
    let spps = common_sample_counts(set, &versions);

    let mut rank_sums = vec![0usize; versions.len()];
    let mut participation = vec![0usize; versions.len()];
    let mut combinations = 0usize;

    for scene in scenes {
        for spp in &spps {
            for metric in metrics {
                let mut entries: Vec<(usize, f64)> = versions
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| {
                        set.result_for(*v, *scene, *spp)
                            .and_then(|r| r.metric(*metric))
                            .map(|value| (i, value))
                    })
                    .collect();
                if entries.is_empty() {
                    continue;
                }
                entries.sort_by(|a, b| metric.compare(a.1, b.1));
                for (position, (i, _)) in entries.iter().enumerate() {
                    rank_sums[*i] += position + 1;
                    participation[*i] += 1;
                }
                combinations += 1;
            }
        }
    }

    if combinations == 0 {
        return Ranking::NoResults;
    }

    let mut entries = Vec::new();
    let mut unranked = Vec::new();
    for (i, version) in versions.iter().enumerate() {
        if participation[i] == 0 {
            unranked.push(*version);
            continue;
        }
        entries.push(RankEntry {
            version: *version,
            name: set.version(*version).map(|v| v.name()).unwrap_or_default(),
            score: rank_sums[i] as f64 / participation[i] as f64,
            combinations: participation[i],
        });
    }
    entries.sort_by(|a, b| a.score.total_cmp(&b.score));

    Ranking::Ranked {
        entries,
        unranked,
        combinations,
    }
}
