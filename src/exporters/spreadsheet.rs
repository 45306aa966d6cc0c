// src/exporters/spreadsheet.rs
use crate::exporters::{ExportFormat, Exporter, PRODUCT_COLUMNS};
use crate::nfce::models::ParseResult;
use crate::utils::error::ExportError;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const PRODUCTS_SHEET: &str = "Produtos";
const SUMMARY_SHEET: &str = "Dados NFC-e";

/// Two-sheet workbook: the product table, and header/issuer fields as label/value pairs.
///
/// Amounts are written as text cells so the fixed-precision strings survive
/// exactly as extracted.
#[derive(Debug, Default)]
pub struct SpreadsheetExporter;

impl From<XlsxError> for ExportError {
    fn from(e: XlsxError) -> Self {
        ExportError::Spreadsheet(e.to_string())
    }
}

/// Cell values of the "Produtos" sheet, without the header row.
pub fn product_rows(result: &ParseResult) -> Vec<[String; 8]> {
    result
        .items
        .iter()
        .map(|item| {
            [
                item.sequence_number.clone(),
                item.product_code.clone(),
                item.description.clone(),
                item.ncm_code.clone(),
                item.quantity.clone(),
                item.unit_of_measure.clone(),
                item.unit_price.clone(),
                item.total_price.clone(),
            ]
        })
        .collect()
}

/// Label/value rows of the "Dados NFC-e" sheet. `None` marks the blank
/// separator row between the document and the issuer blocks.
pub fn summary_rows(result: &ParseResult) -> Vec<Option<(&'static str, String)>> {
    let header = &result.header;
    let issuer = &result.issuer;
    vec![
        Some(("Número NFC-e", header.document_number.clone())),
        Some(("Chave de Acesso", header.access_key.clone())),
        Some(("Data Emissão", header.issue_date.clone())),
        Some(("Valor Total", header.total_amount.clone())),
        Some(("Protocolo", header.authorization_protocol.clone())),
        None,
        Some(("Emitente", issuer.name.clone())),
        Some(("CNPJ", issuer.tax_id.clone())),
        Some(("Inscrição Estadual", issuer.state_registration.clone())),
        Some(("Endereço", issuer.address.clone())),
        Some(("Município/UF", result.municipality_and_state())),
    ]
}

fn write_products(sheet: &mut Worksheet, result: &ParseResult, bold: &Format) -> Result<(), XlsxError> {
    sheet.set_name(PRODUCTS_SHEET)?;
    for (col, title) in PRODUCT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, bold)?;
    }
    for (row, cells) in product_rows(result).into_iter().enumerate() {
        for (col, value) in cells.into_iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, value)?;
        }
    }
    sheet.set_column_width(2, 40)?;
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, result: &ParseResult, bold: &Format) -> Result<(), XlsxError> {
    sheet.set_name(SUMMARY_SHEET)?;
    for (row, entry) in summary_rows(result).into_iter().enumerate() {
        if let Some((label, value)) = entry {
            sheet.write_string_with_format(row as u32, 0, label, bold)?;
            sheet.write_string(row as u32, 1, value)?;
        }
    }
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 60)?;
    Ok(())
}

impl Exporter for SpreadsheetExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn export(&self, result: &ParseResult) -> Result<Vec<u8>, ExportError> {
        let bold = Format::new().set_bold();
        let mut workbook = Workbook::new();

        write_products(workbook.add_worksheet(), result, &bold)?;
        write_summary(workbook.add_worksheet(), result, &bold)?;

        let bytes = workbook.save_to_buffer()?;
        tracing::debug!("Spreadsheet export: {} bytes, {} product rows", bytes.len(), result.item_count());
        Ok(bytes)
    }
}
