//! @ai:module:intent CSV export of per-(scene, spp) errors
//! @ai:module:layer infrastructure
//! @ai:module:public_api CsvReporter, CsvReporterTrait
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::metrics::CsvTable;
use std::io::Write;

/// @ai:intent Trait for CSV export
pub trait CsvReporterTrait {
    /// @ai:intent Write the table as CSV records
    fn write<W: Write>(&self, table: &CsvTable, output: W) -> Result<()>;

    /// @ai:intent Render the table as CSV text
    fn render(&self, table: &CsvTable) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

/// @ai:intent Writes a header row of version names, a header row of metrics, then one row per (scene, spp)
pub struct CsvReporter;

impl CsvReporter {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReporterTrait for CsvReporter {
    /// @ai:effects io
    fn write<W: Write>(&self, table: &CsvTable, output: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().from_writer(output);

        let versions = table.columns.iter().map(|(version, _)| version.as_str());
        writer.write_record(["scene", "spp"].into_iter().chain(versions))?;
        let metrics = table.columns.iter().map(|(_, metric)| metric.as_str());
        writer.write_record(["", ""].into_iter().chain(metrics))?;

        for row in &table.rows {
            let mut record = vec![row.scene.clone(), row.spp.to_string()];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| format!("{:.6}", v)).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
