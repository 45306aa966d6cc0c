// src/nfce/mod.rs
pub mod loader;
pub mod models;

pub use loader::NfceDocument;
pub use models::ParseResult;
