//! @ai:module:intent Build dense metric tables from registered results
//! @ai:module:layer application
//! @ai:module:public_api MetricsAggregator, MetricsAggregatorTrait
//! @ai:module:stateless true

use crate::metrics::types::{CsvRow, CsvScales, CsvTable, Metric, SceneTable, Table};
use crate::model::{Catalog, SceneScope, TechniqueSet, TechniqueVersion, VersionId};
use std::collections::BTreeSet;

/// Row label of the per-column average in mean tables.
pub const ALL_SCENES_LABEL: &str = "All scenes";

/// @ai:intent Trait for metrics aggregation
pub trait MetricsAggregatorTrait {
    /// @ai:intent One table per scene and metric: rows are versions, columns are sample counts
    fn scene_tables(
        &self,
        catalog: &Catalog,
        set: &TechniqueSet,
        versions: &[VersionId],
        scopes: &[SceneScope],
        metrics: &[Metric],
    ) -> Vec<SceneTable>;

    /// @ai:intent Mean metric per scene and version, plus an all-scenes average row
    fn mean_error_table(
        &self,
        catalog: &Catalog,
        set: &TechniqueSet,
        versions: &[VersionId],
        scopes: &[SceneScope],
        metric: Metric,
    ) -> Table;

    /// @ai:intent Flat export with one row per (scene, spp) and one column per (version, metric)
    fn csv_table(
        &self,
        catalog: &Catalog,
        set: &TechniqueSet,
        versions: &[VersionId],
        scopes: &[SceneScope],
        metrics: &[Metric],
        scales: CsvScales,
    ) -> CsvTable;
}

/// @ai:intent Aggregates technique results into tables
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// @ai:intent Create a new metrics aggregator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Columns of a scene: the scope's counts, or the union of the versions' counts
    /// @ai:effects pure
    fn sample_columns(set: &TechniqueSet, versions: &[&TechniqueVersion], scope: &SceneScope) -> Vec<u32> {
        if let Some(counts) = scope.sample_counts() {
            return counts.to_vec();
        }
        let union: BTreeSet<u32> = versions
            .iter()
            .flat_map(|v| set.sample_counts(v.id, Some(scope.scene())))
            .collect();
        union.into_iter().collect()
    }

    fn resolve<'a>(set: &'a TechniqueSet, versions: &[VersionId]) -> Vec<&'a TechniqueVersion> {
        versions.iter().filter_map(|id| set.version(*id)).collect()
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Mean of the values, `None` when there are none
/// @ai:effects pure
fn average<I: Iterator<Item = f64>>(iter: I) -> Option<f64> {
    let (sum, count) = iter.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

impl MetricsAggregatorTrait for MetricsAggregator {
    fn scene_tables(
        &self,
        catalog: &Catalog,
        set: &TechniqueSet,
        versions: &[VersionId],
        scopes: &[SceneScope],
        metrics: &[Metric],
    ) -> Vec<SceneTable> {
        let versions = Self::resolve(set, versions);
        let mut tables = Vec::new();

        for scope in scopes {
            let Some(scene) = catalog.scene(scope.scene()) else {
                tracing::warn!("Unknown scene id {} skipped", scope.scene());
                continue;
            };
            let columns = Self::sample_columns(set, &versions, scope);

            for metric in metrics {
                let cells: Vec<Vec<Option<f64>>> = versions
                    .iter()
                    .map(|v| {
                        columns
                            .iter()
                            .map(|spp| {
                                set.result_for(v.id, scene.id, *spp)
                                    .and_then(|r| r.metric(*metric))
                            })
                            .collect()
                    })
                    .collect();

                let table = Table {
                    title: format!("{} - {}", scene.name, metric.label()),
                    row_labels: versions.iter().map(|v| v.name()).collect(),
                    col_labels: columns.iter().map(u32::to_string).collect(),
                    cells,
                };
                if !table.has_data() {
                    continue;
                }
                tables.push(SceneTable {
                    scene: scene.id,
                    metric: *metric,
                    sample_counts: columns.clone(),
                    versions: versions.iter().map(|v| v.id).collect(),
                    table,
                });
            }
        }

        tables
    }

    fn mean_error_table(
        &self,
        catalog: &Catalog,
        set: &TechniqueSet,
        versions: &[VersionId],
        scopes: &[SceneScope],
        metric: Metric,
    ) -> Table {
        let versions = Self::resolve(set, versions);
        let mut row_labels = Vec::new();
        let mut cells: Vec<Vec<Option<f64>>> = Vec::new();

        for scope in scopes {
            let Some(scene) = catalog.scene(scope.scene()) else {
                continue;
            };
            let row = versions
                .iter()
                .map(|v| {
                    average(
                        set.results_of(v.id)
                            .filter(|r| r.scene == scene.id && scope.allows(r.spp))
                            .filter_map(|r| r.metric(metric)),
                    )
                })
                .collect();
            row_labels.push(scene.name.clone());
            cells.push(row);
        }

        let overall = (0..versions.len())
            .map(|col| average(cells.iter().filter_map(|row| row[col])))
            .collect();
        row_labels.push(ALL_SCENES_LABEL.to_string());
        cells.push(overall);

        Table {
            title: format!("Mean {}", metric.label()),
            row_labels,
            col_labels: versions.iter().map(|v| v.name()).collect(),
            cells,
        }
    }

    fn csv_table(
        &self,
        catalog: &Catalog,
        set: &TechniqueSet,
        versions: &[VersionId],
        scopes: &[SceneScope],
        metrics: &[Metric],
        scales: CsvScales,
    ) -> CsvTable {
        let versions = Self::resolve(set, versions);
        let columns = versions
            .iter()
            .flat_map(|v| metrics.iter().map(move |m| (v.name(), *m)))
            .collect();

        let mut rows = Vec::new();
        for scope in scopes {
            let Some(scene) = catalog.scene(scope.scene()) else {
                continue;
            };
            for spp in Self::sample_columns(set, &versions, scope) {
                let values = versions
                    .iter()
                    .flat_map(|v| {
                        metrics.iter().map(move |m| {
                            set.result_for(v.id, scene.id, spp)
                                .and_then(|r| r.metric(*m))
                                .map(|value| value * scales.factor(*m))
                        })
                    })
                    .collect();
                rows.push(CsvRow {
                    scene: scene.name.clone(),
                    spp,
                    values,
                });
            }
        }

        CsvTable { columns, rows }
    }
}
