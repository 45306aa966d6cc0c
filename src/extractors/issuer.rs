// src/extractors/issuer.rs
use crate::extractors::lookup::{labeled_value, text_contains};
use crate::nfce::models::Issuer;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

const ISSUER_CAPTION: &str = "Emitente";

const NAME_LABEL: &str = "Nome / Razão Social";
const TAX_ID_LABEL: &str = "CNPJ";
const STATE_REGISTRATION_LABEL: &str = "Inscrição Estadual";
const ADDRESS_LABEL: &str = "Endereço";
const MUNICIPALITY_LABEL: &str = "Município";
const STATE_CODE_LABEL: &str = "UF";

static CONTAINER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("fieldset").expect("Failed to compile CONTAINER_SELECTOR")
});

static LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("label").expect("Failed to compile LABEL_SELECTOR")
});

/// The container's own caption: its first direct `legend` child. Legends of
/// nested fieldsets belong to those fieldsets.
fn own_caption(container: ElementRef) -> Option<ElementRef> {
    container
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "legend")
}

/// Finds the container whose own caption mentions the issuer.
fn find_issuer_section(root: ElementRef) -> Option<ElementRef> {
    root.select(&CONTAINER_SELECTOR).find(|container| {
        own_caption(*container).is_some_and(|caption| text_contains(caption, ISSUER_CAPTION))
    })
}

/// Reads the "Emitente" block. A page without one yields an all-empty `Issuer`.
pub fn extract_issuer(root: ElementRef) -> Issuer {
    let Some(section) = find_issuer_section(root) else {
        tracing::debug!("No '{}' section found; issuer left empty", ISSUER_CAPTION);
        return Issuer::default();
    };

    let field = |label: &'static str| {
        labeled_value(section, &LABEL_SELECTOR, label).unwrap_or_default()
    };

    let issuer = Issuer {
        name: field(NAME_LABEL),
        tax_id: field(TAX_ID_LABEL),
        state_registration: field(STATE_REGISTRATION_LABEL),
        address: field(ADDRESS_LABEL),
        municipality: field(MUNICIPALITY_LABEL),
        state_code: field(STATE_CODE_LABEL),
    };
    tracing::debug!("Issuer extracted: '{}' ({})", issuer.name, issuer.tax_id);
    issuer
}
