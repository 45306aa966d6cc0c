// src/extractors/mod.rs
pub mod header;
pub mod issuer;
pub mod items;
pub mod lookup;
pub mod numeric;

use crate::nfce::{NfceDocument, ParseResult};
use crate::utils::error::ExtractError;

/// Runs the three extraction passes (issuer, header, line items) over a loaded page.
///
/// The passes are independent: each one reads the tree on its own and a pass
/// that finds nothing simply leaves its fields empty.
#[derive(Debug, Default)]
pub struct NfceExtractor;

impl NfceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts everything from an already loaded document. Never fails;
    /// missing sections come back as empty fields.
    pub fn extract(&self, document: &NfceDocument) -> ParseResult {
        let root = document.root();

        let issuer = issuer::extract_issuer(root);
        let header = header::extract_header(root);
        let items = items::extract_items(root);

        tracing::info!(
            "Extracted NFC-e {}: issuer '{}', {} items",
            if header.document_number.is_empty() { "<no number>" } else { header.document_number.as_str() },
            issuer.name,
            items.len()
        );

        ParseResult { issuer, header, items }
    }

    /// Loads raw markup and extracts it. `MalformedDocument` is the only failure.
    pub fn extract_str(&self, raw: &str) -> Result<ParseResult, ExtractError> {
        let document = NfceDocument::parse(raw)?;
        Ok(self.extract(&document))
    }

    /// Same as [`extract_str`](Self::extract_str) for raw file contents,
    /// which must be UTF-8.
    pub fn extract_bytes(&self, raw: &[u8]) -> Result<ParseResult, ExtractError> {
        let text = std::str::from_utf8(raw).map_err(|e| {
            ExtractError::MalformedDocument(format!("input is not valid UTF-8: {}", e))
        })?;
        self.extract_str(text)
    }
}
