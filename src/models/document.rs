//! Document model
//!
//! A document record points at a blob in the blob store. Encrypted documents
//! use the `.enc` suffix and have a sibling `.enc.meta.json` object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AssetId, DocumentId, UploadId};

/// Suffix marking a ciphertext object
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Suffix appended to the ciphertext key for its metadata object
pub const META_SUFFIX: &str = ".meta.json";

/// Appended to plain keys that would otherwise end in [`ENCRYPTED_SUFFIX`]
pub const PLAIN_SUFFIX: &str = ".plain";

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Owner of the document
    pub owner_id: String,

    /// Asset this document is attached to, if any
    #[serde(default)]
    pub asset_id: Option<AssetId>,

    /// Original file name
    pub name: String,

    /// Blob store key
    pub path: String,

    /// Stored size in bytes (ciphertext size for encrypted documents)
    pub size: u64,

    /// Original content type
    #[serde(default)]
    pub content_type: Option<String>,

    /// When the document was uploaded
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Whether the stored object is ciphertext
    pub fn is_encrypted(&self) -> bool {
        self.path.ends_with(ENCRYPTED_SUFFIX)
    }

    /// Key of the metadata object for an encrypted document
    pub fn meta_path(&self) -> Option<String> {
        self.is_encrypted().then(|| meta_key(&self.path))
    }
}

/// Storage key for a fresh upload: `{owner}/{millis}_{tag}-{name}`
///
/// `tag` is taken from the upload item, so same-named files uploaded in the
/// same millisecond still get distinct keys. Only ciphertext keys end in
/// `.enc`; a plain file named `*.enc` is stored as `*.enc.plain`.
pub fn storage_key(
    owner_id: &str,
    timestamp: DateTime<Utc>,
    upload_id: UploadId,
    file_name: &str,
    encrypted: bool,
) -> String {
    let tag = upload_id.as_uuid().simple().to_string();
    let mut key = format!(
        "{}/{}_{}-{}",
        owner_id,
        timestamp.timestamp_millis(),
        &tag[..8],
        sanitize_file_name(file_name)
    );
    if encrypted {
        key.push_str(ENCRYPTED_SUFFIX);
    } else if key.ends_with(ENCRYPTED_SUFFIX) {
        key.push_str(PLAIN_SUFFIX);
    }
    key
}

/// Metadata key for a ciphertext key
pub fn meta_key(cipher_key: &str) -> String {
    format!("{}{}", cipher_key, META_SUFFIX)
}

/// Keep only the final path component and drop separators
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        "file".to_string()
    } else {
        base.to_string()
    }
}
