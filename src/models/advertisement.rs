//! Advertisement models

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl AdStatus {
    /// Moderators flip an ad between pending and approved; a rejected ad goes back to pending
    pub fn toggled(self) -> AdStatus {
        match self {
            AdStatus::Pending => AdStatus::Approved,
            AdStatus::Approved | AdStatus::Rejected => AdStatus::Pending,
        }
    }
}

impl fmt::Display for AdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdStatus::Pending => write!(f, "pending"),
            AdStatus::Approved => write!(f, "approved"),
            AdStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    #[serde(rename = "_id")]
    pub id: String,
    pub ad_title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub status: AdStatus,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_email: String,
    #[serde(default)]
    pub product_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDraft {
    pub ad_title: String,
    pub short_description: String,
    pub status: AdStatus,
    pub vendor_name: String,
    pub vendor_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdStatusUpdate {
    pub status: AdStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_toggle() {
        assert_eq!(AdStatus::Pending.toggled(), AdStatus::Approved);
        assert_eq!(AdStatus::Approved.toggled(), AdStatus::Pending);
        assert_eq!(AdStatus::Rejected.toggled(), AdStatus::Pending);
    }
}
