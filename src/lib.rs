pub mod backend;
pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod record;
pub mod storage;
pub mod workflow;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Host serving short links (`https://youtu.be/ID`)
const SHORT_LINK_HOST: &str = "youtu.be";

/// Domain of the main video site (`https://www.youtube.com/watch?v=ID`)
const VIDEO_SITE_DOMAIN: &str = "youtube.com";

/// Requested summary length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Requested summary presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    #[default]
    Paragraph,
    Bullets,
    Detailed,
}

/// The two selections in effect for a summarization request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryOptions {
    pub length: SummaryLength,
    pub style: SummaryStyle,
}

impl std::fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryLength::Short => f.pad("short"),
            SummaryLength::Medium => f.pad("medium"),
            SummaryLength::Long => f.pad("long"),
        }
    }
}

impl std::fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryStyle::Paragraph => f.pad("paragraph"),
            SummaryStyle::Bullets => f.pad("bullets"),
            SummaryStyle::Detailed => f.pad("detailed"),
        }
    }
}

/// Extract the video ID from a short link or a watch URL.
///
/// Anything that does not parse as a URL, or points at another host, yields `None`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    let id = if host == SHORT_LINK_HOST {
        url.path_segments()?.next()?.to_string()
    } else if host.contains(VIDEO_SITE_DOMAIN) {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };

    if id.is_empty() { None } else { Some(id) }
}
