// src/exporters/delimited.rs
use crate::exporters::{ExportFormat, Exporter, PRODUCT_COLUMNS};
use crate::nfce::models::ParseResult;
use crate::utils::error::ExportError;
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Semicolon-separated product table, one row per line item.
///
/// Every field is quoted (embedded quotes doubled), which keeps descriptions
/// with `;` or `"` intact for spreadsheet imports.
#[derive(Debug, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn export(&self, result: &ParseResult) -> Result<Vec<u8>, ExportError> {
        let mut writer = WriterBuilder::new()
            .delimiter(b';')
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(PRODUCT_COLUMNS)
            .map_err(|e| ExportError::Csv(e.to_string()))?;

        for item in &result.items {
            writer
                .write_record([
                    &item.sequence_number,
                    &item.product_code,
                    &item.description,
                    &item.ncm_code,
                    &item.quantity,
                    &item.unit_of_measure,
                    &item.unit_price,
                    &item.total_price,
                ])
                .map_err(|e| ExportError::Csv(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.to_string()))?;
        tracing::debug!("CSV export: {} bytes, {} rows", bytes.len(), result.item_count());
        Ok(bytes)
    }
}
