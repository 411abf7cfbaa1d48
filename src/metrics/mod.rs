//! @ai:module:intent Metric tables and version rankings
//! @ai:module:layer application
//! @ai:module:public_api Metric, Direction, Table, SceneTable, CsvTable, CsvScales, Ranking, RankEntry, MetricsAggregator, rank_versions

pub mod aggregator;
pub mod ranking;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use aggregator::{MetricsAggregator, MetricsAggregatorTrait, ALL_SCENES_LABEL};
pub use ranking::{common_sample_counts, rank_versions};
pub use types::{
    CsvRow, CsvScales, CsvTable, Direction, Metric, RankEntry, Ranking, SceneTable, Table,
};
