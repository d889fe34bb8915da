use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SummaryLength, SummaryOptions, SummaryStyle};

/// Video metadata as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One successful summarization, as kept in history and favorites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub id: String,
    #[serde(default)]
    pub url: String,
    pub summary: String,
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
    #[serde(default)]
    pub summary_length: SummaryLength,
    #[serde(default)]
    pub summary_style: SummaryStyle,
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorited_at: Option<DateTime<Utc>>,
}

impl SummaryRecord {
    pub fn options(&self) -> SummaryOptions {
        SummaryOptions {
            length: self.summary_length,
            style: self.summary_style,
        }
    }

    /// Title if the backend supplied one, otherwise the video ID, otherwise the URL
    pub fn display_title(&self) -> &str {
        self.video_info
            .as_ref()
            .and_then(|vi| vi.title.as_deref().or(vi.video_id.as_deref()))
            .unwrap_or(&self.url)
    }
}
