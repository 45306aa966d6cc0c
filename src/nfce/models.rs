// src/nfce/models.rs
use serde::{Deserialize, Serialize};

/// The legal entity that issued the receipt ("Emitente" block).
/// Every field is empty when the page omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub name: String,
    pub tax_id: String,             // CNPJ
    pub state_registration: String, // Inscrição Estadual
    pub address: String,
    pub municipality: String,
    pub state_code: String,         // UF
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub access_key: String,
    pub document_number: String,
    pub issue_date: String,
    /// Kept as printed on the page (locale formatted, e.g. "1.234,56").
    pub total_amount: String,
    pub authorization_protocol: String,
}

/// One product row of the receipt.
///
/// `quantity`, `unit_price` and `total_price` are already formatted with
/// fixed precision (4, 2 and 2 fractional digits). `unit_price` is always
/// derived from the other two, never read from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sequence_number: String,
    pub product_code: String,
    pub description: String,
    pub ncm_code: String,
    pub quantity: String,
    pub unit_of_measure: String,
    pub unit_price: String,
    pub total_price: String,
}

/// Everything extracted from one receipt page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub issuer: Issuer,
    pub header: DocumentHeader,
    pub items: Vec<LineItem>,
}

impl ParseResult {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// "Município/UF" pair as shown on the summary sheet.
    pub fn municipality_and_state(&self) -> String {
        format!("{}/{}", self.issuer.municipality, self.issuer.state_code)
    }

    /// Identifier used to name output files: the access key without spaces,
    /// falling back to the document number, or `None` when both are missing.
    /// Only ASCII letters, digits, `_` and `-` are kept, so page text can never
    /// form a path.
    pub fn document_id(&self) -> Option<String> {
        [&self.header.access_key, &self.header.document_number]
            .into_iter()
            .map(|value| path_safe(value))
            .find(|id| !id.is_empty())
    }
}

fn path_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
