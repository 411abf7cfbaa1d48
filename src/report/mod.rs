//! @ai:module:intent Report generation: console tables, CSV export, JSON snapshot and charts
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, TextRenderer, CsvReporter, JsonReporter, ChartGenerator

pub mod charts;
pub mod csv;
pub mod json_report;
pub mod tables;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use csv::{CsvReporter, CsvReporterTrait};
pub use json_report::{JsonReporter, JsonReporterTrait, SnapshotSelection};
pub use tables::{format_value, TextRenderer};

use crate::metrics::{Ranking, SceneTable};
use crate::model::Catalog;
use anyhow::Result;
use std::path::Path;

/// Folder of the results page data inside the output directory.
pub const DATA_DIR: &str = "data";

/// Folder of the charts inside the output directory.
pub const CHARTS_DIR: &str = "charts";

/// @ai:intent Combined report generator for the results page
pub struct ReportGenerator {
    json: JsonReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Write the JSON snapshot under `data/`
    /// @ai:effects fs:write
    pub fn generate_snapshot(
        &self,
        catalog: &Catalog,
        selection: &SnapshotSelection,
        output_dir: &Path,
    ) -> Result<()> {
        self.json
            .generate(catalog, selection, &output_dir.join(DATA_DIR))?;
        Ok(())
    }

    /// @ai:intent Write the snapshot and the charts
    /// @ai:effects fs:write
    pub fn generate_all(
        &self,
        catalog: &Catalog,
        selection: &SnapshotSelection,
        ranking: &Ranking,
        tables: &[SceneTable],
        output_dir: &Path,
    ) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        self.generate_snapshot(catalog, selection, output_dir)?;
        self.charts
            .generate_all(catalog, ranking, tables, &output_dir.join(CHARTS_DIR))?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
