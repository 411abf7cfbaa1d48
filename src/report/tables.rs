//! @ai:module:intent Plain-text rendering of catalog listings, metric tables, rankings and configurations
//! @ai:module:layer infrastructure
//! @ai:module:public_api TextRenderer
//! @ai:module:stateless true

use crate::configuration::Configuration;
use crate::metrics::{Ranking, Table};
use crate::model::{Catalog, TechniqueKind, TechniqueSet};
use crate::workspace::Entry;
use std::fmt::Write as FmtWrite;

/// Marker printed for a cell without data.
pub const NO_DATA: &str = "-";

/// @ai:intent Format a metric value; very small values use scientific notation
/// @ai:effects pure
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => NO_DATA.to_string(),
        Some(v) if v != 0.0 && v.abs() < 1e-3 => format!("{:.4e}", v),
        Some(v) => format!("{:.4}", v),
    }
}

/// @ai:intent Lay out rows as left-aligned columns under a header and a dashed rule
/// @ai:effects pure
fn columns(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut output = String::new();
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let _ = writeln!(output, "{}", line(header));
    let _ = writeln!(output, "{}", "-".repeat(total));
    for row in rows {
        let _ = writeln!(output, "{}", line(row));
    }
    output
}

fn heading(output: &mut String, title: &str) {
    let _ = writeln!(output, "{}", title);
    let _ = writeln!(output, "{}", "=".repeat(title.chars().count()));
}

/// @ai:intent Renders benchmark data as console text
pub struct TextRenderer;

impl TextRenderer {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Render a metric table with `-` for missing cells
    /// @ai:effects pure
    pub fn table(&self, table: &Table) -> String {
        let mut header = vec![String::new()];
        header.extend(table.col_labels.iter().cloned());
        let rows: Vec<Vec<String>> = table
            .row_labels
            .iter()
            .zip(&table.cells)
            .map(|(label, cells)| {
                let mut row = vec![label.clone()];
                row.extend(cells.iter().map(|cell| format_value(*cell)));
                row
            })
            .collect();

        let mut output = String::new();
        heading(&mut output, &table.title);
        output.push_str(&columns(&header, &rows));
        output
    }

    /// @ai:intent Render several tables, or "No results" when there is none
    /// @ai:effects pure
    pub fn tables<'a>(&self, tables: impl IntoIterator<Item = &'a Table>) -> String {
        let rendered: Vec<String> = tables.into_iter().map(|t| self.table(t)).collect();
        if rendered.is_empty() {
            "No results\n".to_string()
        } else {
            rendered.join("\n")
        }
    }

    /// @ai:intent Render a ranking with positions, scores and unranked versions
    /// @ai:effects pure
    pub fn ranking(&self, ranking: &Ranking, set: &TechniqueSet) -> String {
        let Ranking::Ranked {
            entries,
            unranked,
            combinations,
        } = ranking
        else {
            return "No results\n".to_string();
        };

        let header: Vec<String> = ["#", "Version", "Score", "Combinations"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                vec![
                    (i + 1).to_string(),
                    entry.name.clone(),
                    format!("{:.3}", entry.score),
                    entry.combinations.to_string(),
                ]
            })
            .collect();

        let mut output = String::new();
        heading(&mut output, &format!("Ranking over {} combinations", combinations));
        output.push_str(&columns(&header, &rows));
        if !unranked.is_empty() {
            let names: Vec<String> = unranked
                .iter()
                .filter_map(|id| set.version(*id))
                .map(|v| v.name())
                .collect();
            let _ = writeln!(output, "Unranked (no comparable results): {}", names.join(", "));
        }
        output
    }

    /// @ai:intent List scenes grouped by renderer, optionally only those of ready renderers
    /// @ai:effects pure
    pub fn scenes(&self, catalog: &Catalog, ready_only: bool) -> String {
        let header: Vec<String> = ["Id", "Scene", "Renderer", "Sample counts"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = catalog
            .renderers()
            .iter()
            .filter(|renderer| !ready_only || renderer.is_ready)
            .flat_map(|renderer| {
                renderer
                    .scenes
                    .iter()
                    .filter_map(|id| catalog.scene(*id))
                    .map(move |scene| {
                        let spps: Vec<String> = scene.spps.iter().map(u32::to_string).collect();
                        vec![
                            scene.id.to_string(),
                            scene.name.clone(),
                            renderer.name.clone(),
                            spps.join(" "),
                        ]
                    })
            })
            .collect();

        let mut output = String::new();
        heading(&mut output, "SCENES");
        output.push_str(&columns(&header, &rows));
        output
    }

    /// @ai:intent List the versions of a technique kind with their status
    /// @ai:effects pure
    pub fn techniques(&self, set: &TechniqueSet) -> String {
        let header: Vec<String> = ["Id", "Name", "Status", "Message"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = set
            .versions()
            .iter()
            .map(|v| {
                vec![
                    v.id.to_string(),
                    v.name(),
                    v.status.to_string(),
                    v.message.clone(),
                ]
            })
            .collect();

        let mut output = String::new();
        heading(&mut output, set.kind().heading());
        output.push_str(&columns(&header, &rows));
        output
    }

    /// @ai:intent Detailed description of the techniques owning the given versions
    /// @ai:effects pure
    pub fn technique_info(&self, set: &TechniqueSet, versions: &[crate::model::VersionId]) -> String {
        let mut output = String::new();
        let mut shown = Vec::new();
        for version in versions.iter().filter_map(|id| set.version(*id)) {
            if shown.contains(&version.technique) {
                continue;
            }
            shown.push(version.technique);
            let Some(technique) = set.technique(version.technique) else {
                continue;
            };
            if !output.is_empty() {
                output.push('\n');
            }
            let _ = writeln!(output, "Name:      {}", technique.name);
            let _ = writeln!(output, "Full name: {}", technique.full_name);
            let _ = writeln!(output, "Comment:   {}", technique.comment);
            let _ = writeln!(output, "Citation:  {}", technique.citation);
            let _ = writeln!(output, "Versions:");
            for v in technique.versions.iter().filter_map(|id| set.version(*id)) {
                let _ = writeln!(output, "  [{}] {} ({}) {}", v.id, v.tag, v.status, v.message);
            }
        }
        output
    }

    /// @ai:intent Numbered listing of configurations or slots, marking the current one
    /// @ai:effects pure
    pub fn entries(&self, title: &str, entries: &[Entry]) -> String {
        let header: Vec<String> = ["Id", "Name", "Created", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                vec![
                    (i + 1).to_string(),
                    entry.name.clone(),
                    entry.created_date(),
                    if entry.is_current { "*".to_string() } else { String::new() },
                ]
            })
            .collect();

        let mut output = String::new();
        heading(&mut output, title);
        output.push_str(&columns(&header, &rows));
        output
    }

    /// @ai:intent Scenes with their sample counts and the selected versions of a configuration
    /// @ai:effects pure
    pub fn configuration(&self, config: &Configuration, catalog: &Catalog) -> String {
        let mut output = String::new();
        heading(&mut output, &format!("Configuration {}", config.name));

        let header: Vec<String> = ["Id", "Scene", "Renderer", "Sample counts"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = config
            .scenes()
            .iter()
            .filter_map(|entry| catalog.scene(entry.scene).map(|scene| (entry, scene)))
            .map(|(entry, scene)| {
                let spps: Vec<String> = entry.spps.iter().map(u32::to_string).collect();
                vec![
                    scene.id.to_string(),
                    scene.name.clone(),
                    catalog.renderer_name(scene.id).unwrap_or_default().to_string(),
                    spps.join(" "),
                ]
            })
            .collect();
        output.push('\n');
        output.push_str(&columns(&header, &rows));

        for kind in TechniqueKind::ALL {
            let set = catalog.techniques(kind);
            let names: Vec<String> = config
                .versions(kind)
                .iter()
                .filter_map(|id| set.version(*id))
                .map(|v| format!("[{}] {}", v.id, v.name()))
                .collect();
            let _ = writeln!(output, "\n{}:", kind.heading());
            if names.is_empty() {
                let _ = writeln!(output, "  (none)");
            }
            for name in names {
                let _ = writeln!(output, "  {}", name);
            }
        }
        output
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{add_filter, add_mse, catalog_with_scenes};
    use crate::metrics::rank_versions;
    use crate::metrics::{Metric, RankEntry};
    use crate::model::VersionId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "-");
        assert_eq!(format_value(Some(0.5)), "0.5000");
        assert_eq!(format_value(Some(0.0)), "0.0000");
        assert_eq!(format_value(Some(0.00025)), "2.5000e-4");
    }

    #[test]
    fn test_table_rendering_marks_missing_cells() {
        let table = Table {
            title: "box - MSE".to_string(),
            row_labels: vec!["LBF".to_string(), "NFOR".to_string()],
            col_labels: vec!["4".to_string(), "8".to_string()],
            cells: vec![vec![Some(0.25), None], vec![Some(0.125), Some(0.0625)]],
        };
        let text = TextRenderer::new().table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "box - MSE");
        assert_eq!(lines[1], "=========");
        assert_eq!(lines[2], "      4       8");
        assert_eq!(lines[4], "LBF   0.2500  -");
        assert_eq!(lines[5], "NFOR  0.1250  0.0625");
    }

    #[test]
    fn test_no_tables_prints_no_results() {
        assert_eq!(TextRenderer::new().tables(Vec::<&Table>::new()), "No results\n");
    }

    #[test]
    fn test_ranking_rendering() {
        let (mut catalog, scenes) = catalog_with_scenes(&["box", "sponza"]);
        let a = add_filter(&mut catalog, "A");
        let b = add_filter(&mut catalog, "B");
        let c = add_filter(&mut catalog, "C");
        add_mse(&mut catalog, a, scenes[0], 4, 0.01);
        add_mse(&mut catalog, b, scenes[0], 4, 0.02);
        add_mse(&mut catalog, c, scenes[1], 4, 0.5);
        let ranking = rank_versions(&catalog.filters, &[a, b, c], &scenes[..1], &[Metric::Mse]);

        let text = TextRenderer::new().ranking(&ranking, &catalog.filters);
        assert!(text.starts_with("Ranking over 1 combinations\n"));
        assert!(text.contains("1  A        1.000"));
        assert!(text.contains("2  B        2.000"));
        assert!(text.ends_with("Unranked (no comparable results): C\n"));
    }

    #[test]
    fn test_empty_ranking() {
        let (catalog, _) = catalog_with_scenes(&[]);
        let text = TextRenderer::new().ranking(&Ranking::NoResults, &catalog.filters);
        assert_eq!(text, "No results\n");

        let ranked = Ranking::Ranked {
            entries: vec![RankEntry {
                version: VersionId(1),
                name: "A".to_string(),
                score: 1.0,
                combinations: 1,
            }],
            unranked: vec![],
            combinations: 1,
        };
        assert!(!TextRenderer::new().ranking(&ranked, &catalog.filters).contains("Unranked"));
    }

    #[test]
    fn test_configuration_listing() {
        let (mut catalog, scenes) = catalog_with_scenes(&["box", "sponza"]);
        let a = add_filter(&mut catalog, "A");
        let config = Configuration::new("cfg", &scenes[..1], &[a], &[], &[4, 8]);

        let text = TextRenderer::new().configuration(&config, &catalog);
        assert!(text.contains("box"));
        assert!(!text.contains("sponza"));
        assert!(text.contains("4 8"));
        assert!(text.contains("DENOISERS:\n  [1] A"));
        assert!(text.contains("SAMPLERS:\n  (none)"));
    }
}
