// src/utils/html_debug.rs
use crate::utils::error::AppError;
use std::fs;
use std::path::Path;

/// Text anchors the extraction passes rely on, with their highlight type.
pub const ANCHOR_PATTERNS: &[(&str, &str)] = &[
    (r"<legend[^>]*>[^<]*Emitente[^<]*</legend>", "issuer"),
    (r"Chave de acesso", "access_key"),
    (r"(?:Nome / Razão Social|CNPJ|Inscrição Estadual|Endereço|Município|UF)\s*</label>", "label"),
    (r"(?:Número NFC-e|Data de Emissão|Valor Total|Protocolo de autorização)[^<]*</label>", "label"),
    (r#"class="[^"]*fixo-prod-serv-numero[^"]*""#, "product"),
    (r#"class="[^"]*toggab?le[^"]*""#, "detail"),
    (r"Código (?:do Produto|NCM)", "detail"),
];

/// Builds a copy of `html` with each `(start, end, type)` span wrapped in a
/// highlighted `<span>`. Overlapping spans keep the one that starts first.
pub fn annotate_html(html: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-issuer { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-access_key { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-label { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-product { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-detail { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);
        debug_html.push_str(&format!(
            "<span class=\"highlight-{}\" title=\"Position: {}-{}, Type: {}\">",
            highlight_type, start, end, highlight_type
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");
        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Finds every match of the given regex patterns in `html`.
pub fn find_highlights<'p>(
    html: &str,
    patterns: &[(&str, &'p str)],
) -> Result<Vec<(usize, usize, &'p str)>, AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();
    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;
        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }
    Ok(highlights)
}

/// Writes an annotated copy of a receipt page with the extraction anchors highlighted.
pub fn create_debug_html(html: &str, path: &Path) -> Result<usize, AppError> {
    let highlights = find_highlights(html, ANCHOR_PATTERNS)?;
    fs::write(path, annotate_html(html, &highlights))?;
    tracing::info!("Saved debug HTML with {} anchors to {}", highlights.len(), path.display());
    Ok(highlights.len())
}
