//! @ai:module:intent SVG charts of rankings and per-scene error curves
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator, ChartGeneratorTrait, rank_bars, metric_curves
//! @ai:module:stateless true

use crate::metrics::{Ranking, SceneTable};
use crate::model::Catalog;
use anyhow::Result;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// File name of the ranking chart.
pub const RANK_CHART: &str = "rank.svg";

/// @ai:intent Bars of a ranking: (version name, score), best first
/// @ai:effects pure
pub fn rank_bars(ranking: &Ranking) -> Vec<(String, f64)> {
    match ranking {
        Ranking::Ranked { entries, .. } => entries.iter().map(|e| (e.name.clone(), e.score)).collect(),
        Ranking::NoResults => Vec::new(),
    }
}

/// @ai:intent One curve per version of a scene table: points (column index, value), gaps dropped
/// @ai:effects pure
pub fn metric_curves(table: &SceneTable) -> Vec<(String, Vec<(f64, f64)>)> {
    table
        .table
        .row_labels
        .iter()
        .zip(&table.table.cells)
        .map(|(name, cells)| {
            let points: Vec<(f64, f64)> = cells
                .iter()
                .enumerate()
                .filter_map(|(i, cell)| cell.map(|v| (i as f64, v)))
                .collect();
            (name.clone(), points)
        })
        .filter(|(_, points)| !points.is_empty())
        .collect()
}

/// @ai:intent File name of a scene chart, with characters unsafe in paths replaced
/// @ai:effects pure
pub fn scene_chart_name(scene: &str, table: &SceneTable) -> String {
    let safe: String = scene
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}.svg", safe, table.metric.as_str())
}

/// @ai:intent Padded value range of a set of points; a flat series gets a unit span
/// @ai:effects pure
fn value_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = if max > min { (max - min) * 0.1 } else { 0.5 };
    (min - pad)..(max + pad)
}

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait {
    /// @ai:intent Write the ranking chart and one chart per scene table; returns the written files
    fn generate_all(
        &self,
        catalog: &Catalog,
        ranking: &Ranking,
        tables: &[SceneTable],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>>;
}

/// @ai:intent Generates SVG charts from rankings and scene tables
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Bar chart of rank scores, lower is better
    /// @ai:effects fs:write
    fn generate_rank_chart(&self, bars: &[(String, f64)], output_path: &Path) -> Result<()> {
        let root = SVGBackend::new(output_path, (800, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_score = bars.iter().map(|(_, s)| *s).fold(1.0, f64::max);
        let mut chart = ChartBuilder::on(&root)
            .caption("Rank score (lower is better)", ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..bars.len() as i32, 0f64..max_score + 0.5)?;

        chart
            .configure_mesh()
            .x_labels(bars.len())
            .y_desc("Score")
            .x_label_formatter(&|x| {
                bars.get(*x as usize)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, score))| {
            Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *score)], BLUE.mix(0.7).filled())
        }))?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Line chart of one metric against sample count for every version of a scene
    /// @ai:effects fs:write
    fn generate_scene_chart(&self, title: &str, table: &SceneTable, output_path: &Path) -> Result<()> {
        let curves = metric_curves(table);
        let root = SVGBackend::new(output_path, (800, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let columns = table.sample_counts.len().max(1) as f64;
        let y_range = value_range(curves.iter().flat_map(|(_, p)| p.iter().map(|(_, v)| *v)));
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..columns - 0.5, y_range)?;

        chart
            .configure_mesh()
            .x_labels(table.sample_counts.len())
            .x_desc("spp")
            .y_desc(table.metric.label())
            .x_label_formatter(&|x| {
                let index = x.round();
                if (x - index).abs() > 1e-6 || index < 0.0 {
                    return String::new();
                }
                table
                    .sample_counts
                    .get(index as usize)
                    .map(u32::to_string)
                    .unwrap_or_default()
            })
            .draw()?;

        for (i, (name, points)) in curves.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            let style = color.stroke_width(2);
            chart
                .draw_series(LineSeries::new(points.iter().copied(), style))?
                .label(name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            chart.draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate all charts; a chart that fails to render is logged and skipped
    /// @ai:effects fs:write
    fn generate_all(
        &self,
        catalog: &Catalog,
        ranking: &Ranking,
        tables: &[SceneTable],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;
        let mut generated = Vec::new();

        let bars = rank_bars(ranking);
        if !bars.is_empty() {
            let path = output_dir.join(RANK_CHART);
            match self.generate_rank_chart(&bars, &path) {
                Ok(()) => generated.push(path),
                Err(e) => tracing::warn!("Rank chart not generated: {}", e),
            }
        }

        for table in tables {
            let scene = catalog
                .scene(table.scene)
                .map(|s| s.name.as_str())
                .unwrap_or("scene");
            let path = output_dir.join(scene_chart_name(scene, table));
            match self.generate_scene_chart(&table.table.title, table, &path) {
                Ok(()) => generated.push(path),
                Err(e) => tracing::warn!("Chart {} not generated: {}", path.display(), e),
            }
        }

        tracing::info!("{} charts written to {}", generated.len(), output_dir.display());
        Ok(generated)
    }
}
