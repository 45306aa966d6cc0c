// src/extractors/header.rs
use crate::extractors::lookup::{first_text, labeled_value_any, row_cell};
use crate::nfce::models::DocumentHeader;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

const ACCESS_KEY_LABEL: &str = "Chave de acesso";
const DOCUMENT_NUMBER_LABEL: &str = "Número NFC-e";
const ISSUE_DATE_LABEL: &str = "Data de Emissão";
const TOTAL_AMOUNT_LABEL: &str = "Valor Total";
const PROTOCOL_LABEL: &str = "Protocolo de autorização";

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("label").expect("Failed to compile LABEL_SELECTOR")
});

// Some portals print header pairs as plain table cells instead of <label>s.
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td, th").expect("Failed to compile CELL_SELECTOR")
});

static PROTOCOL_ID_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[id*='nProt']").expect("Failed to compile PROTOCOL_ID_SELECTOR")
});

fn labeled(root: ElementRef, label: &'static str) -> String {
    labeled_value_any(root, &[&*LABEL_SELECTOR, &*CELL_SELECTOR], label)
}

/// The access key lives in a two-column row; fall back to a label/value pair
/// when no such row carries a value.
fn extract_access_key(root: ElementRef) -> String {
    match row_cell(root, &ROW_SELECTOR, ACCESS_KEY_LABEL, 1) {
        Some(key) if !key.is_empty() => key,
        _ => {
            tracing::debug!("No '{}' row value; trying labeled lookup", ACCESS_KEY_LABEL);
            labeled(root, ACCESS_KEY_LABEL)
        }
    }
}

fn extract_protocol(root: ElementRef) -> String {
    let protocol = labeled(root, PROTOCOL_LABEL);
    if !protocol.is_empty() {
        return protocol;
    }
    first_text(root, &PROTOCOL_ID_SELECTOR).unwrap_or_default()
}

/// Reads the document header from anywhere in the page.
pub fn extract_header(root: ElementRef) -> DocumentHeader {
    let header = DocumentHeader {
        access_key: extract_access_key(root),
        document_number: labeled(root, DOCUMENT_NUMBER_LABEL),
        issue_date: labeled(root, ISSUE_DATE_LABEL),
        total_amount: labeled(root, TOTAL_AMOUNT_LABEL),
        authorization_protocol: extract_protocol(root),
    };
    tracing::debug!(
        "Header extracted: number '{}', access key '{}'",
        header.document_number,
        header.access_key
    );
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    #[test]
    fn test_header_mixed_layouts() {
        let html = r#"
            <table class="box">
                <tr><td>Chave de acesso</td><td> 3124 0512 3456 7800 0190 6500 1000 0045 2110 0004 5217 </td></tr>
            </table>
            <div>
                <label>Número NFC-e</label><span>4521</span>
                <label>Data de Emissão</label><span>12/05/2024 10:31:07</span>
                <label>Valor Total R$</label><span>1.234,56</span>
                <label>Protocolo de autorização</label><span>131240012345678</span>
            </div>
        "#;
        let doc = Html::parse_document(html);
        let header = extract_header(doc.root_element());
        assert_eq!(
            header,
            DocumentHeader {
                access_key: "3124 0512 3456 7800 0190 6500 1000 0045 2110 0004 5217".to_string(),
                document_number: "4521".to_string(),
                issue_date: "12/05/2024 10:31:07".to_string(),
                total_amount: "1.234,56".to_string(),
                authorization_protocol: "131240012345678".to_string(),
            }
        );
    }

    #[test]
    fn test_access_key_label_fallback() {
        let html = r#"<div><label>Chave de acesso:</label><span>1234 5678 9012</span></div>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_header(doc.root_element()).access_key, "1234 5678 9012");
    }

    #[test]
    fn test_number_from_table_cells() {
        let html = r#"<table><tr><td>Número NFC-e</td><td>000123</td><td>Série</td><td>1</td></tr></table>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_header(doc.root_element()).document_number, "000123");
    }

    #[test]
    fn test_protocol_id_fallback() {
        let html = r#"<div><span id="lblnProt">131240012345678 12/05/2024</span></div>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            extract_header(doc.root_element()).authorization_protocol,
            "131240012345678 12/05/2024"
        );
    }

    #[test]
    fn test_missing_header_fields_are_empty() {
        let doc = Html::parse_document("<p>nothing here</p>");
        assert_eq!(extract_header(doc.root_element()), DocumentHeader::default());
    }
}
