// src/extractors/items.rs
use crate::extractors::lookup::{first_text, innermost, labeled_value, next_element_sibling};
use crate::extractors::numeric::{finite_or_zero, format_fixed, normalize, unit_price};
use crate::nfce::models::LineItem;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

const QUANTITY_DIGITS: usize = 4;
const PRICE_DIGITS: usize = 2;

const PRODUCT_CODE_LABEL: &str = "Código do Produto";
const NCM_LABEL: &str = "Código NCM";

// Classes that mark a detail region ("toggle" rows expand into "toggable" tables).
const DETAIL_MARKERS: [&str; 2] = ["toggle", "toggable"];

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static NUMBER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".fixo-prod-serv-numero").expect("Failed to compile NUMBER_SELECTOR")
});
static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".fixo-prod-serv-descricao").expect("Failed to compile DESCRIPTION_SELECTOR")
});
static QUANTITY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".fixo-prod-serv-qtd").expect("Failed to compile QUANTITY_SELECTOR")
});
static UNIT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".fixo-prod-serv-uc").expect("Failed to compile UNIT_SELECTOR")
});
static TOTAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".fixo-prod-serv-vb").expect("Failed to compile TOTAL_SELECTOR")
});

// Inside a detail region labels come in many shapes (label, span, td, b...).
static DETAIL_LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("*").expect("Failed to compile DETAIL_LABEL_SELECTOR")
});

// Used when the code is printed inline with its label ("Código NCM: 22021000").
static NCM_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Código NCM\s*:?\s*([0-9]+)").expect("Failed to compile NCM_TEXT_RE")
});
static PRODUCT_CODE_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Código do Produto\s*:?\s*([^\s:]\S*)").expect("Failed to compile PRODUCT_CODE_TEXT_RE")
});

fn is_product_row(element: ElementRef) -> bool {
    element.select(&NUMBER_SELECTOR).next().is_some()
}

fn has_detail_marker(element: ElementRef) -> bool {
    element
        .value()
        .classes()
        .any(|class| DETAIL_MARKERS.contains(&class))
}

/// First following sibling carrying a detail marker, stopping at the next product.
fn next_marked_sibling(element: ElementRef) -> Option<ElementRef> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|sibling| !is_product_row(*sibling))
        .find(|sibling| has_detail_marker(*sibling))
}

/// Locates the detail region for a product row.
///
/// Scans following siblings up to the next product row and takes the first one
/// carrying a detail marker. Without a marked sibling, the immediate next
/// sibling is used unless it is itself a product row. Pages that give every
/// product its own table put the detail table next to that table instead,
/// so a lone product row falls back to scanning its table's siblings.
fn find_detail_region(row: ElementRef) -> Option<ElementRef> {
    if let Some(marked) = next_marked_sibling(row) {
        return Some(marked);
    }
    if let Some(next) = next_element_sibling(row) {
        return (!is_product_row(next)).then_some(next);
    }

    let table = row
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")?;
    if innermost(table, &ROW_SELECTOR, is_product_row).count() != 1 {
        return None;
    }
    next_marked_sibling(table)
}

/// Reads one code from a detail region: labeled sibling first, inline text second.
fn detail_code(region: ElementRef, label: &'static str, pattern: &Regex) -> String {
    if let Some(value) = labeled_value(region, &DETAIL_LABEL_SELECTOR, label) {
        if !value.is_empty() {
            return value;
        }
    }
    let text = region.text().collect::<String>();
    pattern
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Builds a `LineItem` from a product row and its (optional) detail region.
fn extract_line_item(row: ElementRef) -> LineItem {
    let sequence_number = first_text(row, &NUMBER_SELECTOR).unwrap_or_default();
    let quantity_text = first_text(row, &QUANTITY_SELECTOR).unwrap_or_else(|| "0".to_string());
    let total_text = first_text(row, &TOTAL_SELECTOR).unwrap_or_else(|| "0".to_string());

    let mut quantity = normalize(&quantity_text);
    if !quantity.is_finite() {
        tracing::warn!("Item {}: unreadable quantity '{}', using 0", sequence_number, quantity_text);
        quantity = finite_or_zero(quantity);
    }
    let mut total = normalize(&total_text);
    if !total.is_finite() {
        tracing::warn!("Item {}: unreadable total '{}', using 0", sequence_number, total_text);
        total = finite_or_zero(total);
    }

    let (product_code, ncm_code) = match find_detail_region(row) {
        Some(region) => (
            detail_code(region, PRODUCT_CODE_LABEL, &PRODUCT_CODE_TEXT_RE),
            detail_code(region, NCM_LABEL, &NCM_TEXT_RE),
        ),
        None => {
            tracing::trace!("Item {}: no detail region", sequence_number);
            (String::new(), String::new())
        }
    };

    LineItem {
        sequence_number,
        product_code,
        description: first_text(row, &DESCRIPTION_SELECTOR).unwrap_or_default(),
        ncm_code,
        quantity: format_fixed(quantity, QUANTITY_DIGITS),
        unit_of_measure: first_text(row, &UNIT_SELECTOR).unwrap_or_default(),
        unit_price: format_fixed(unit_price(total, quantity), PRICE_DIGITS),
        total_price: format_fixed(total, PRICE_DIGITS),
    }
}

/// Extracts every product row of the receipt, in document order.
pub fn extract_items(root: ElementRef) -> Vec<LineItem> {
    let items: Vec<LineItem> = innermost(root, &ROW_SELECTOR, is_product_row)
        .map(extract_line_item)
        .collect();
    tracing::debug!("Extracted {} line items", items.len());
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn product_row(number: &str, desc: &str, qty: &str, unit: &str, total: &str) -> String {
        format!(
            r#"<tr id="Item + {number}">
                <td><span class="fixo-prod-serv-numero">{number}</span></td>
                <td><span class="fixo-prod-serv-descricao">{desc}</span></td>
                <td><span class="fixo-prod-serv-qtd">{qty}</span></td>
                <td><span class="fixo-prod-serv-uc">{unit}</span></td>
                <td><span class="fixo-prod-serv-vb">{total}</span></td>
            </tr>"#
        )
    }

    fn items_of(html: &str) -> Vec<LineItem> {
        let doc = Html::parse_document(html);
        extract_items(doc.root_element())
    }

    #[test]
    fn test_single_row_without_detail() {
        let html = format!(
            "<table class=\"box\">{}</table>",
            product_row("1", "REFRIGERANTE 2L", "2,000", "UN", "10,00")
        );
        let items = items_of(&html);
        assert_eq!(
            items,
            vec![LineItem {
                sequence_number: "1".to_string(),
                product_code: String::new(),
                description: "REFRIGERANTE 2L".to_string(),
                ncm_code: String::new(),
                quantity: "2.0000".to_string(),
                unit_of_measure: "UN".to_string(),
                unit_price: "5.00".to_string(),
                total_price: "10.00".to_string(),
            }]
        );
    }

    #[test]
    fn test_immediate_detail_sibling() {
        let html = format!(
            r#"<table class="box">{}
                <tr><td>
                    <label>Código do Produto</label><span>7891000100103</span>
                    <label>Código NCM</label><span>22021000</span>
                </td></tr>
            </table>"#,
            product_row("1", "AGUA", "3,000", "UN", "4,50")
        );
        let items = items_of(&html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_code, "7891000100103");
        assert_eq!(items[0].ncm_code, "22021000");
        assert_eq!(items[0].unit_price, "1.50");
    }

    #[test]
    fn test_detail_found_past_intervening_rows() {
        let html = format!(
            r#"<table class="box">{}
                <tr class="spacer"><td>&nbsp;</td></tr>
                <tr class="toggle"><td>Código do Produto: ABC-12 Código NCM: 04012010</td></tr>
                {}
            </table>"#,
            product_row("1", "LEITE", "12,000", "UN", "59,88"),
            product_row("2", "PAO", "0,350", "KG", "5,25"),
        );
        let items = items_of(&html);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_code, "ABC-12");
        assert_eq!(items[0].ncm_code, "04012010");
        // no detail of its own; must not borrow item 1's
        assert_eq!(items[1].product_code, "");
        assert_eq!(items[1].ncm_code, "");
        assert_eq!(items[1].quantity, "0.3500");
        assert_eq!(items[1].unit_price, "15.00");
    }

    #[test]
    fn test_adjacent_product_row_is_not_a_detail_region() {
        let html = format!(
            "<table>{}{}</table>",
            product_row("1", "A", "1,000", "UN", "1,00"),
            product_row("2", "B", "1,000", "UN", "2,00"),
        );
        let items = items_of(&html);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sequence_number, "1");
        assert_eq!(items[1].sequence_number, "2");
        assert_eq!(items[1].total_price, "2.00");
    }

    #[test]
    fn test_zero_and_malformed_quantity_guard() {
        let html = format!(
            "<table>{}{}</table>",
            product_row("1", "BRINDE", "0,000", "UN", "3,00"),
            product_row("2", "LIXO", "n/d", "UN", "3,00"),
        );
        let items = items_of(&html);
        assert_eq!(items[0].quantity, "0.0000");
        assert_eq!(items[0].unit_price, "0.00");
        assert_eq!(items[0].total_price, "3.00");
        assert_eq!(items[1].quantity, "0.0000");
        assert_eq!(items[1].unit_price, "0.00");
    }

    #[test]
    fn test_thousands_separator_in_total() {
        let html = format!(
            "<table>{}</table>",
            product_row("7", "TV", "1,000", "UN", "2.499,90")
        );
        let items = items_of(&html);
        assert_eq!(items[0].total_price, "2499.90");
        assert_eq!(items[0].unit_price, "2499.90");
    }

    #[test]
    fn test_unit_price_times_quantity_matches_total() {
        let cases = [
            ("3,000", "10,00"),
            ("0,755", "7,48"),
            ("2,500", "12,35"),
            ("10,000", "10,05"),
            ("7,000", "1,00"),
            ("125,000", "99,99"),
        ];
        let rows: String = cases
            .iter()
            .enumerate()
            .map(|(i, (qty, total))| product_row(&(i + 1).to_string(), "X", qty, "KG", total))
            .collect();
        let items = items_of(&format!("<table>{}</table>", rows));
        assert_eq!(items.len(), cases.len());
        // The unit price is rounded to 2 digits, so the product drifts by up
        // to half a cent per unit of quantity.
        for item in items {
            let qty: f64 = item.quantity.parse().unwrap();
            let unit: f64 = item.unit_price.parse().unwrap();
            let total: f64 = item.total_price.parse().unwrap();
            let bound = 0.005 * qty + 0.005 + 1e-9;
            assert!((unit * qty - total).abs() <= bound, "{:?}", item);
        }
    }

    #[test]
    fn test_rows_without_marker_are_skipped() {
        let html = format!(
            "<table><tr><td>Qtde. total de itens</td><td>1</td></tr>{}</table>",
            product_row("1", "A", "1,000", "UN", "1,00")
        );
        assert_eq!(items_of(&html).len(), 1);
    }
}
