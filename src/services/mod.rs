//! Service layer for FinNest
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, audit logging, and cross-entity operations.

pub mod asset;
pub mod fx;
pub mod household;
pub mod share;
pub mod vault;

pub use asset::{AssetService, NewAsset, PortfolioTotal};
pub use fx::FxService;
pub use household::{HouseholdService, NewContact, NewLiability, NewPolicy};
pub use share::{CreateShareRequest, CreatedShare, ShareService, SharedView};
pub use vault::{DownloadedFile, UploadItem, UploadStatus, VaultService};
