//! Document repository for JSON storage
//!
//! Manages loading and saving document records to documents.json. The bytes
//! themselves live in the blob store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{FinnestError, FinnestResult};
use crate::models::{AssetId, Document, DocumentId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable document data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct DocumentData {
    documents: Vec<Document>,
}

/// Repository for document record persistence
pub struct DocumentRepository {
    path: PathBuf,
    data: RwLock<HashMap<DocumentId, Document>>,
}

impl DocumentRepository {
    /// Create a new document repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load documents from disk
    pub fn load(&self) -> FinnestResult<()> {
        let file_data: DocumentData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for document in file_data.documents {
            data.insert(document.id, document);
        }

        Ok(())
    }

    /// Save documents to disk
    pub fn save(&self) -> FinnestResult<()> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut documents: Vec<Document> = data.values().cloned().collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.path.cmp(&b.path)));

        write_json_atomic(&self.path, &DocumentData { documents })
    }

    /// Get a document by ID
    pub fn get(&self, id: DocumentId) -> FinnestResult<Option<Document>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all documents, newest first
    pub fn get_all(&self) -> FinnestResult<Vec<Document>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut documents: Vec<Document> = data.values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        Ok(documents)
    }

    /// Get documents belonging to an owner, optionally only those on one asset
    pub fn get_for_owner(
        &self,
        owner_id: &str,
        asset_id: Option<AssetId>,
    ) -> FinnestResult<Vec<Document>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|d| d.owner_id == owner_id)
            .filter(|d| asset_id.is_none() || d.asset_id == asset_id)
            .collect())
    }

    /// Find a document by full ID, printed short ID, or unambiguous prefix
    pub fn resolve(&self, identifier: &str) -> FinnestResult<Document> {
        if let Ok(id) = identifier.parse::<DocumentId>() {
            if let Some(document) = self.get(id)? {
                return Ok(document);
            }
        }

        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let matches: Vec<&Document> = data
            .values()
            .filter(|d| d.id.matches_prefix(identifier))
            .collect();

        match matches.as_slice() {
            [document] => Ok((*document).clone()),
            [] => Err(FinnestError::document_not_found(identifier)),
            _ => Err(FinnestError::Validation(format!(
                "Document id '{}' is ambiguous ({} matches)",
                identifier,
                matches.len()
            ))),
        }
    }

    /// Insert or update a document
    pub fn upsert(&self, document: Document) -> FinnestResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(document.id, document);
        Ok(())
    }

    /// Delete a document, returning the removed record
    pub fn delete(&self, id: DocumentId) -> FinnestResult<Option<Document>> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id))
    }

    /// Count documents
    pub fn count(&self) -> FinnestResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, DocumentRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");
        let repo = DocumentRepository::new(path);
        (temp_dir, repo)
    }

    fn document(owner: &str, name: &str) -> Document {
        Document {
            id: DocumentId::new(),
            owner_id: owner.to_string(),
            asset_id: None,
            name: name.to_string(),
            path: format!("{}/1-{}", owner, name),
            size: 3,
            content_type: Some("text/plain".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let doc = document("owner-1", "will.pdf");
        let id = doc.id;

        repo.upsert(doc).unwrap();
        repo.save().unwrap();

        let repo2 = DocumentRepository::new(temp_dir.path().join("documents.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().name, "will.pdf");
    }

    #[test]
    fn test_get_all_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let mut old = document("o", "old.txt");
        old.created_at = Utc::now() - Duration::days(1);
        repo.upsert(old).unwrap();
        repo.upsert(document("o", "new.txt")).unwrap();

        let names: Vec<String> = repo.get_all().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["new.txt", "old.txt"]);
    }

    #[test]
    fn test_owner_and_asset_filter() {
        let (_temp_dir, repo) = create_test_repo();
        let asset = AssetId::new();
        let mut linked = document("o", "deed.pdf");
        linked.asset_id = Some(asset);

        repo.upsert(linked).unwrap();
        repo.upsert(document("o", "misc.txt")).unwrap();
        repo.upsert(document("someone-else", "x.txt")).unwrap();

        assert_eq!(repo.get_for_owner("o", None).unwrap().len(), 2);
        let on_asset = repo.get_for_owner("o", Some(asset)).unwrap();
        assert_eq!(on_asset.len(), 1);
        assert_eq!(on_asset[0].name, "deed.pdf");
    }

    #[test]
    fn test_resolve_by_short_id() {
        let (_temp_dir, repo) = create_test_repo();
        let doc = document("o", "will.pdf");
        let short = doc.id.to_string();
        let full = doc.id.as_uuid().to_string();
        repo.upsert(doc).unwrap();

        assert_eq!(repo.resolve(&short).unwrap().name, "will.pdf");
        assert_eq!(repo.resolve(&full).unwrap().name, "will.pdf");
        assert!(repo.resolve("doc-zzzzzzzz").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_returns_record() {
        let (_temp_dir, repo) = create_test_repo();
        let doc = document("o", "a.txt");
        let id = doc.id;
        repo.upsert(doc).unwrap();

        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.delete(id).unwrap().is_none());
    }
}
