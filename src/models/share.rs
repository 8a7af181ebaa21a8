//! Share link model
//!
//! A share is a capability: anyone holding the token can read the listed
//! assets, nothing more.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AssetId;

/// Who a share was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareTarget {
    Beneficiary,
    Advisor,
}

impl ShareTarget {
    /// Parse target type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beneficiary" => Some(Self::Beneficiary),
            "advisor" | "adviser" => Some(Self::Advisor),
            _ => None,
        }
    }
}

impl fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beneficiary => write!(f, "beneficiary"),
            Self::Advisor => write!(f, "advisor"),
        }
    }
}

/// What the holder of a share may do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePermissions {
    #[serde(default)]
    pub view: bool,
    #[serde(default)]
    pub download: bool,
}

/// A persisted share link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    /// Random opaque token
    pub token: String,
    pub target_type: ShareTarget,
    /// Beneficiary id for beneficiary shares
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub asset_ids: Vec<AssetId>,
    #[serde(default)]
    pub permissions: SharePermissions,
    #[serde(default)]
    pub message: String,
    pub created_at: DateTime<Utc>,
}
