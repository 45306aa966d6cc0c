// src/exporters/mod.rs
pub mod delimited;
pub mod spreadsheet;
pub mod xml;

use crate::nfce::models::ParseResult;
use crate::utils::error::ExportError;

pub use delimited::CsvExporter;
pub use spreadsheet::SpreadsheetExporter;
pub use xml::XmlExporter;

/// Column titles shared by the CSV table and the "Produtos" sheet.
pub const PRODUCT_COLUMNS: [&str; 8] = [
    "Item",
    "Código",
    "Descrição",
    "NCM",
    "Quantidade",
    "Unidade",
    "Valor Unitário",
    "Valor Total",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xml,
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Xml, Self::Csv, Self::Xlsx, Self::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }

    pub fn exporter(&self) -> Box<dyn Exporter> {
        match self {
            Self::Xml => Box::new(XmlExporter),
            Self::Csv => Box::new(CsvExporter),
            Self::Xlsx => Box::new(SpreadsheetExporter),
            Self::Json => Box::new(JsonExporter),
        }
    }
}

/// A stateless serialization of an extracted receipt.
/// Implementations must reproduce field values exactly and render absent
/// values as empty cells/elements.
pub trait Exporter {
    fn format(&self) -> ExportFormat;

    fn export(&self, result: &ParseResult) -> Result<Vec<u8>, ExportError>;
}

/// Pretty-printed serde representation of the whole `ParseResult`.
#[derive(Debug, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn export(&self, result: &ParseResult) -> Result<Vec<u8>, ExportError> {
        let mut bytes = serde_json::to_vec_pretty(result)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
