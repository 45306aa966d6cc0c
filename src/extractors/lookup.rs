// src/extractors/lookup.rs
//! DOM retrieval primitives shared by the issuer, header and line-item passes.
//!
//! Receipt pages mix two layouts: label/value pairs (`<label>CNPJ:</label><span>..</span>`)
//! and table rows (`<tr><td>Chave de acesso</td><td>..</td></tr>`). Both are handled
//! here generically; the passes only decide which labels to look for and where.

use scraper::{ElementRef, Selector};

/// Concatenated descendant text, trimmed.
pub fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Whether the element's full text contains `needle` (substring match).
pub fn text_contains(element: ElementRef, needle: &str) -> bool {
    element.text().collect::<String>().contains(needle)
}

/// The next sibling that is an element, skipping text and comment nodes.
pub fn next_element_sibling(element: ElementRef) -> Option<ElementRef> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Elements under `scope` matching `selector` and `predicate`, in document order,
/// keeping only the innermost ones: an element is dropped when one of its own
/// descendants also matches. A `<td>` wrapping a whole nested table therefore
/// never shadows the cell that actually carries the text.
pub fn innermost<'a, P>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
    predicate: P,
) -> impl Iterator<Item = ElementRef<'a>> + 'a
where
    P: Fn(ElementRef<'a>) -> bool + 'a,
{
    scope.select(selector).filter(move |candidate| {
        predicate(*candidate)
            && !candidate
                .select(selector)
                .any(|descendant| descendant.id() != candidate.id() && predicate(descendant))
    })
}

/// First innermost element matching `selector` whose text contains `label`.
pub fn find_label<'a>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
    label: &'a str,
) -> Option<ElementRef<'a>> {
    innermost(scope, selector, move |el| text_contains(el, label)).next()
}

/// Labeled-sibling lookup: finds the first label element containing `label`
/// and returns the trimmed text of its immediately following sibling element.
///
/// `None` means no label matched at all; a label without a following sibling
/// yields `Some("")`, so callers can tell "label absent" from "value absent".
pub fn labeled_value<'a>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
    label: &'a str,
) -> Option<String> {
    let label_element = find_label(scope, selector, label)?;
    tracing::trace!(
        "Label '{}' matched <{}> '{}'",
        label,
        label_element.value().name(),
        element_text(label_element)
    );
    Some(
        next_element_sibling(label_element)
            .map(element_text)
            .unwrap_or_default(),
    )
}

/// Tries each selector in turn until one of them has a matching label.
/// Empty string when none does.
pub fn labeled_value_any<'a>(
    scope: ElementRef<'a>,
    selectors: &[&'a Selector],
    label: &'a str,
) -> String {
    selectors
        .iter()
        .copied()
        .find_map(|selector| labeled_value(scope, selector, label))
        .unwrap_or_default()
}

/// Row/column lookup: first innermost row whose text contains `marker`,
/// then the trimmed text of its cell at `column` (0-based, `td` or `th` children).
pub fn row_cell<'a>(
    scope: ElementRef<'a>,
    row_selector: &'a Selector,
    marker: &'a str,
    column: usize,
) -> Option<String> {
    let row = innermost(scope, row_selector, move |el| text_contains(el, marker)).next()?;
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .nth(column)
        .map(element_text)
}

/// Trimmed text of the first descendant matching `selector`, if any.
pub fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}
