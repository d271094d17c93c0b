//! DTOs for the analytics summary endpoint.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::AnalyticsSummary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_clicks: i64,
    pub unique_visitors: i64,
    /// `YYYY-MM-DD` → clicks, in date order.
    pub clicks_by_date: Vec<DateBucket>,
    pub countries: HashMap<String, i64>,
    pub devices: HashMap<String, i64>,
    pub browsers: HashMap<String, i64>,
    pub referrers: HashMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct DateBucket {
    pub date: String,
    pub clicks: i64,
}

impl From<AnalyticsSummary> for AnalyticsResponse {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            total_clicks: summary.total_clicks,
            unique_visitors: summary.unique_visitors,
            clicks_by_date: summary
                .clicks_by_date
                .into_iter()
                .map(|(date, clicks)| DateBucket {
                    date: date.format("%Y-%m-%d").to_string(),
                    clicks,
                })
                .collect(),
            countries: summary.countries,
            devices: summary.devices,
            browsers: summary.browsers,
            referrers: summary.referrers,
        }
    }
}
