// src/nfce/loader.rs
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

// At least one start tag, end tag, doctype/comment or processing instruction.
static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[A-Za-z!/?]").expect("Failed to compile MARKUP_TAG_RE")
});

/// A parsed receipt page, ready for the extraction passes.
///
/// html5ever recovers from almost anything, so the checks that make a page
/// unusable live here rather than in the parser.
#[derive(Debug)]
pub struct NfceDocument {
    html: Html,
}

impl NfceDocument {
    /// Parses raw markup text. Fails with `MalformedDocument` for empty input,
    /// binary content, or text that carries no markup at all.
    pub fn parse(raw: &str) -> Result<Self, ExtractError> {
        if raw.trim().is_empty() {
            return Err(ExtractError::MalformedDocument("document is empty".to_string()));
        }

        // C0 controls only; C1 characters turn up in mis-decoded cp1252 text.
        if let Some(c) = raw.chars().find(|c| *c <= '\u{1f}' && !c.is_whitespace()) {
            tracing::debug!("Rejecting input containing control character U+{:04X}", c as u32);
            return Err(ExtractError::MalformedDocument(
                "input contains binary data".to_string(),
            ));
        }

        if !MARKUP_TAG_RE.is_match(raw) {
            return Err(ExtractError::MalformedDocument(
                "input does not contain any markup tags".to_string(),
            ));
        }

        let html = Html::parse_document(raw);
        if !html.errors.is_empty() {
            tracing::debug!("Parser recovered from {} markup errors", html.errors.len());
        }
        tracing::debug!("Loaded document ({} bytes)", raw.len());

        Ok(Self { html })
    }

    /// The `<html>` element; every lookup scoped to the whole page starts here.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}
