use serde::{Deserialize, Serialize};

use crate::format::format_minutes_seconds;

/// One entry of a catalog search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub track_id: i64,
    pub track_name: String,
    pub collection_name: String,
    pub track_time_millis: u64,
    pub artwork_url30: String,
    pub artwork_url60: String,
    pub artwork_url100: String,
}

impl TrackRecord {
    /// The artwork URL used as the image cache key (60px).
    pub fn artwork_key(&self) -> &str {
        &self.artwork_url60
    }

    /// Track length as `m:ss`
    pub fn length_label(&self) -> String {
        format_minutes_seconds(self.track_time_millis)
    }
}

/// Top-level shape of the search payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<TrackRecord>,
}
