//! Document CLI commands
//!
//! Upload, download and organize documents in the local vault.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::config::Settings;
use crate::crypto::{PlainFile, RustCryptoProvider};
use crate::display::{format_document_list, format_upload_item, format_upload_summary};
use crate::error::{FinnestError, FinnestResult};
use crate::services::{UploadItem, VaultService};
use crate::storage::file_io::write_bytes_atomic;
use crate::storage::Storage;

use super::passphrase::{read_new_passphrase, read_passphrase};

/// Document subcommands
#[derive(Subcommand)]
pub enum DocCommands {
    /// Upload one or more files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Owner the documents belong to
        #[arg(long, env = "FINNEST_OWNER", default_value = "me")]
        owner: String,
        /// Attach to an asset (name or ID)
        #[arg(short, long)]
        asset: Option<String>,
        /// Encrypt before storing
        #[arg(short, long)]
        encrypt: bool,
    },
    /// Download a document, decrypting it if needed
    Download {
        /// Document ID
        document: String,
        /// Output path (defaults to the original file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List documents
    List {
        #[arg(long, env = "FINNEST_OWNER", default_value = "me")]
        owner: String,
        /// Only documents attached to this asset
        #[arg(short, long)]
        asset: Option<String>,
    },
    /// Delete a document and its stored objects
    Delete {
        /// Document ID
        document: String,
    },
    /// Attach a document to an asset
    Link {
        /// Document ID
        document: String,
        /// Asset name or ID
        asset: String,
    },
    /// Detach a document from its asset
    Unlink {
        /// Document ID
        document: String,
    },
}

/// Handle a document command
pub fn handle_doc_command(
    storage: &Storage,
    settings: &Settings,
    cmd: DocCommands,
) -> FinnestResult<()> {
    let blobs = storage.local_blobs();
    let crypto = RustCryptoProvider;
    let vault = VaultService::new(storage, &blobs, &crypto, &settings.encryption);

    match cmd {
        DocCommands::Upload {
            files,
            owner,
            asset,
            encrypt,
        } => {
            let asset_id = asset
                .map(|a| storage.assets.resolve(&a).map(|found| found.id))
                .transpose()?;
            // An unreadable path fails its own item; the rest still upload
            let mut plain_files = Vec::with_capacity(files.len());
            let mut items = Vec::new();
            for path in &files {
                match read_plain_file(path) {
                    Ok(file) => plain_files.push(file),
                    Err(e) => {
                        let item = UploadItem::failed(path.display().to_string(), e.to_string());
                        println!("{}", format_upload_item(&item));
                        items.push(item);
                    }
                }
            }

            if !plain_files.is_empty() {
                let passphrase = if encrypt {
                    settings.encryption.kdf.check_strength()?;
                    Some(read_new_passphrase()?)
                } else {
                    None
                };

                items.extend(vault.upload_batch_with(
                    &owner,
                    asset_id,
                    plain_files,
                    passphrase.as_ref(),
                    |item| {
                        if item.is_done() || item.error().is_some() {
                            println!("{}", format_upload_item(item));
                        }
                    },
                )?);
            }

            println!("{}", format_upload_summary(&items));
            let failed = items.iter().filter(|i| !i.is_done()).count();
            if failed > 0 {
                return Err(FinnestError::Storage(format!(
                    "{} of {} uploads failed",
                    failed,
                    items.len()
                )));
            }
        }

        DocCommands::Download {
            document,
            output,
            force,
        } => {
            let found = storage.documents.resolve(&document)?;
            let passphrase = if found.is_encrypted() {
                Some(read_passphrase()?)
            } else {
                None
            };

            let file = vault.download(found.id, passphrase.as_ref())?;
            let target = output.unwrap_or_else(|| PathBuf::from(safe_file_name(&file.name)));
            if target.exists() && !force {
                return Err(FinnestError::Validation(format!(
                    "{} already exists (use --force to overwrite)",
                    target.display()
                )));
            }

            write_bytes_atomic(&target, &file.bytes)?;
            println!(
                "Saved {} ({}, {} bytes) to {}",
                file.name,
                file.content_type,
                file.bytes.len(),
                target.display()
            );
        }

        DocCommands::List { owner, asset } => {
            let asset_id = asset
                .map(|a| storage.assets.resolve(&a).map(|found| found.id))
                .transpose()?;
            let documents = vault.list(&owner, asset_id)?;
            print!("{}", format_document_list(&documents));
        }

        DocCommands::Delete { document } => {
            let found = storage.documents.resolve(&document)?;
            let deleted = vault.delete(found.id)?;
            println!("Deleted document: {} ({})", deleted.name, deleted.id);
        }

        DocCommands::Link { document, asset } => {
            let found = storage.documents.resolve(&document)?;
            let asset = storage.assets.resolve(&asset)?;
            let linked = vault.link(found.id, asset.id)?;
            println!("Linked {} to {}", linked.name, asset.name);
        }

        DocCommands::Unlink { document } => {
            let found = storage.documents.resolve(&document)?;
            let unlinked = vault.unlink(found.id)?;
            println!("Unlinked {}", unlinked.name);
        }
    }

    Ok(())
}

fn read_plain_file(path: &Path) -> FinnestResult<PlainFile> {
    let bytes = std::fs::read(path)
        .map_err(|e| FinnestError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FinnestError::Validation(format!("Not a file: {}", path.display())))?;
    let content_type = guess_content_type(&name).map(str::to_string);
    Ok(PlainFile::new(name, content_type, bytes))
}

/// Content type from the file extension
pub fn guess_content_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        _ => return None,
    })
}

/// Keep only the last path component of a stored name
fn safe_file_name(name: &str) -> String {
    let last = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    match last {
        "" | "." | ".." => "file".to_string(),
        other => other.to_string(),
    }
}
