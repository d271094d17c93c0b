//! DTOs for the owner link listing endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_limit: Option<i64>,
    pub expired: bool,
}

impl From<&Link> for LinkItem {
    fn from(link: &Link) -> Self {
        Self {
            short_code: link.slug.clone(),
            original_url: link.long_url.clone(),
            created_at: link.created_at,
            clicks: link.clicks,
            click_limit: link.expiry.click_limit(),
            expired: link.is_expired(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub items: Vec<LinkItem>,
}
