// src/storage/mod.rs
use crate::exporters::ExportFormat;
use crate::nfce::models::ParseResult;
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory holding every artifact of one receipt: /base_dir/<document_id>/
    ///
    /// The id must be a single plain path component so nothing lands outside
    /// `base_dir`.
    pub fn document_dir(&self, document_id: &str) -> Result<PathBuf, StorageError> {
        let mut components = Path::new(document_id).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) || document_id.contains('\\')
        {
            return Err(StorageError::InvalidDocumentId(document_id.to_string()));
        }

        let target_dir = self.base_dir.join(document_id);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves one exported artifact as /base_dir/<document_id>/nfce_<document_id>.<ext>
    pub fn save_export(
        &self,
        document_id: &str,
        format: ExportFormat,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_id)?
            .join(format!("nfce_{}.{}", document_id, format.extension()));

        fs::write(&file_path, content).map_err(StorageError::IoError)?;

        tracing::info!("Saved {:?} export to {}", format, file_path.display());
        Ok(file_path)
    }

    /// Saves a JSON sidecar describing the extraction run.
    pub fn save_metadata(
        &self,
        document_id: &str,
        result: &ParseResult,
        source: &Path,
        formats: &[ExportFormat],
    ) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_id)?
            .join(format!("nfce_{}_meta.json", document_id));

        let metadata = serde_json::json!({
            "source_file": source.display().to_string(),
            "document_id": document_id,
            "access_key": result.header.access_key,
            "document_number": result.header.document_number,
            "issuer_name": result.issuer.name,
            "issuer_tax_id": result.issuer.tax_id,
            "item_count": result.item_count(),
            "formats": formats.iter().map(|f| f.extension()).collect::<Vec<_>>(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_export_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path().join("out")).unwrap();

        let path = storage.save_export("4521", ExportFormat::Csv, b"a;b\n").unwrap();
        assert_eq!(path, tmp.path().join("out").join("4521").join("nfce_4521.csv"));
        assert_eq!(fs::read(&path).unwrap(), b"a;b\n");
    }

    #[test]
    fn test_document_id_cannot_leave_base_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("a").join("out");
        let storage = StorageManager::new(&out_dir).unwrap();

        for id in ["../../etc/x", "..", "/etc", "a/b", "a\\b", ""] {
            assert!(
                matches!(
                    storage.save_export(id, ExportFormat::Xml, b"<x/>"),
                    Err(StorageError::InvalidDocumentId(_))
                ),
                "id {:?} was accepted",
                id
            );
        }
        assert!(!tmp.path().join("etc").exists());

        let mut result = ParseResult::default();
        result.header.document_number = "../../etc/x".to_string();
        let id = result.document_id().unwrap();
        let path = storage.save_export(&id, ExportFormat::Xml, b"<x/>").unwrap();
        assert!(path.starts_with(&out_dir));
    }

    #[test]
    fn test_save_metadata_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();

        let mut result = ParseResult::default();
        result.header.document_number = "4521".to_string();
        result.issuer.name = "ACME LTDA".to_string();

        let path = storage
            .save_metadata(
                "4521",
                &result,
                Path::new("cupom.html"),
                &[ExportFormat::Xml, ExportFormat::Json],
            )
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["document_number"], "4521");
        assert_eq!(json["issuer_name"], "ACME LTDA");
        assert_eq!(json["item_count"], 0);
        assert_eq!(json["formats"], serde_json::json!(["xml", "json"]));
        assert!(json["extraction_timestamp"].as_str().is_some());
    }
}
