//! @ai:module:intent Value types for aggregated error tables and version rankings
//! @ai:module:layer domain
//! @ai:module:public_api Metric, Direction, Table, CsvTable, CsvRow, CsvScales, RankEntry, Ranking
//! @ai:module:stateless true

use crate::error::Error;
use crate::model::{SceneId, VersionId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// @ai:intent Image error metric reported by the comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mse,
    Psnr,
    Ssim,
    Rmse,
}

/// @ai:intent Which way a metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Mse, Metric::Psnr, Metric::Ssim, Metric::Rmse];

    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Mse => "mse",
            Metric::Psnr => "psnr",
            Metric::Ssim => "ssim",
            Metric::Rmse => "rmse",
        }
    }

    /// @ai:effects pure
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Mse => "MSE",
            Metric::Psnr => "PSNR",
            Metric::Ssim => "SSIM",
            Metric::Rmse => "RMSE",
        }
    }

    /// @ai:effects pure
    pub fn direction(&self) -> Direction {
        match self {
            Metric::Mse | Metric::Rmse => Direction::LowerIsBetter,
            Metric::Psnr | Metric::Ssim => Direction::HigherIsBetter,
        }
    }

    /// @ai:intent Order two values so that the better one comes first
    /// @ai:effects pure
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        match self.direction() {
            Direction::LowerIsBetter => a.total_cmp(&b),
            Direction::HigherIsBetter => b.total_cmp(&a),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mse" => Ok(Metric::Mse),
            "psnr" => Ok(Metric::Psnr),
            "ssim" => Ok(Metric::Ssim),
            "rmse" => Ok(Metric::Rmse),
            _ => Err(Error::UnknownMetric(s.to_string())),
        }
    }
}

/// @ai:intent Dense labelled table where `None` marks a missing measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Table {
    /// @ai:intent Whether at least one cell holds a value
    /// @ai:effects pure
    pub fn has_data(&self) -> bool {
        self.cells.iter().flatten().any(Option::is_some)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// @ai:intent Per-scene metric table together with the coordinates it was built for
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTable {
    pub scene: SceneId,
    pub metric: Metric,
    pub sample_counts: Vec<u32>,
    pub versions: Vec<VersionId>,
    pub table: Table,
}

/// @ai:intent Multipliers applied to tiny error values before CSV export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvScales {
    pub mse: f64,
    pub rmse: f64,
}

impl Default for CsvScales {
    fn default() -> Self {
        Self { mse: 1.0, rmse: 1.0 }
    }
}

impl CsvScales {
    /// @ai:effects pure
    pub fn factor(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mse => self.mse,
            Metric::Rmse => self.rmse,
            Metric::Psnr | Metric::Ssim => 1.0,
        }
    }
}

/// @ai:intent One (scene, sample count) line of the CSV export
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub scene: String,
    pub spp: u32,
    pub values: Vec<Option<f64>>,
}

/// @ai:intent CSV export data: one column per (version, metric)
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub columns: Vec<(String, Metric)>,
    pub rows: Vec<CsvRow>,
}

/// @ai:intent Rank score of one version
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub version: VersionId,
    pub name: String,
    /// Mean 1-based position over the combinations the version took part in
    pub score: f64,
    pub combinations: usize,
}

/// @ai:intent Outcome of ranking a set of versions
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    Ranked {
        /// Sorted by score, best first
        entries: Vec<RankEntry>,
        /// Selected versions without any comparable value
        unranked: Vec<VersionId>,
        /// Number of (scene, spp, metric) combinations that had at least one value
        combinations: usize,
    },
    NoResults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parse_and_display() {
        assert_eq!("PSNR".parse::<Metric>().unwrap(), Metric::Psnr);
        assert_eq!(Metric::Rmse.to_string(), "rmse");
        assert!(matches!("l1".parse::<Metric>(), Err(Error::UnknownMetric(_))));
    }

    #[test]
    fn test_metric_direction_orders_better_first() {
        assert_eq!(Metric::Mse.compare(0.1, 0.2), Ordering::Less);
        assert_eq!(Metric::Ssim.compare(0.9, 0.8), Ordering::Less);
        assert_eq!(Metric::Psnr.direction(), Direction::HigherIsBetter);
    }

    #[test]
    fn test_table_has_data() {
        let mut table = Table {
            title: "box - MSE".to_string(),
            row_labels: vec!["A".to_string()],
            col_labels: vec!["4".to_string()],
            cells: vec![vec![None]],
        };
        assert!(!table.has_data());
        table.cells[0][0] = Some(0.5);
        assert!(table.has_data());
        assert_eq!(table.cell(0, 0), Some(0.5));
        assert_eq!(table.cell(1, 0), None);
    }
}
