//! API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comparison operator the activity listing applies to `startActivityId`
pub const OPERATOR_AT_OR_AFTER: &str = ">=";

/// Account login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A camera registered to the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessory {
    pub name: String,
    pub accessory_id: String,

    /// Host serving live images for this accessory; may be empty
    #[serde(default)]
    pub node_id: String,
}

/// Single-page activity query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesPageRequest {
    pub start_activity_id: String,
    pub operator: String,
    pub limit: u32,
}

impl ActivitiesPageRequest {
    /// Request up to `limit` activities whose id is at or after `cursor`
    pub fn at_or_after(cursor: impl Into<String>, limit: u32) -> Self {
        Self {
            start_activity_id: cursor.into(),
            operator: OPERATOR_AT_OR_AFTER.to_string(),
            limit,
        }
    }
}

/// Single-page activity response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitiesPageResponse {
    pub activities: Vec<ActivityRecord>,
}

/// An activity as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// UTC timestamp in `YYYYMMDDTHHMMSSZ` form, doubling as the page cursor
    pub activity_id: String,

    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Session cache file payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSession {
    pub credential: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}
