use std::io::Write;
use std::path::Path;

use eyre::Result;

use crate::record::SummaryRecord;

/// Longest summary excerpt shown in list views
const EXCERPT_CHARS: usize = 72;

/// Render just the summary text
pub fn render_text(record: &SummaryRecord) -> String {
    record.summary.clone()
}

/// Render a record as pretty JSON
pub fn render_json(record: &SummaryRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_default()
}

/// Render a list of records as a pretty JSON array
pub fn render_json_list(records: &[SummaryRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_default()
}

/// Render the summary along with video and analysis details
pub fn render_details(record: &SummaryRecord) -> String {
    let mut lines = vec![
        format!("Title:    {}", record.display_title()),
        format!("URL:      {}", record.url),
        format!("Created:  {}", record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Options:  {} / {}", record.summary_length, record.summary_style),
    ];

    if let Some(info) = &record.video_info {
        if let Some(lang) = &info.language {
            lines.push(format!("Language: {lang}"));
        }
        if let Some(words) = info.word_count {
            lines.push(format!("Words:    {words}"));
        }
    }

    if let Some(topics) = analysis_list(record, "topics") {
        lines.push(format!("Topics:   {topics}"));
    }
    if let Some(phrases) = analysis_list(record, "key_phrases") {
        lines.push(format!("Phrases:  {phrases}"));
    }

    lines.push(String::new());
    lines.push(record.summary.clone());
    lines.join("\n")
}

/// One line per record: id, date, options, favorite marker, title and excerpt
pub fn render_list_line(record: &SummaryRecord, favorite: bool) -> String {
    let marker = if favorite { "*" } else { " " };
    format!(
        "{} {marker} {}  {:<6} {:<9}  {}  {}",
        record.id,
        record.timestamp.format("%Y-%m-%d"),
        record.summary_length,
        record.summary_style,
        record.display_title(),
        excerpt(&record.summary),
    )
}

/// Write the summary text to `path`; with `append`, add it after a blank line instead
pub fn write_summary(path: &Path, record: &SummaryRecord, append: bool) -> Result<()> {
    if append {
        let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
        write!(file, "\n\n{}", record.summary)?;
    } else {
        std::fs::write(path, &record.summary)?;
    }
    Ok(())
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Analysis entries are either plain strings or objects carrying a name
fn analysis_list(record: &SummaryRecord, key: &str) -> Option<String> {
    let items = record.analysis.as_ref()?.get(key)?.as_array()?;
    let names: Vec<&str> = items
        .iter()
        .filter_map(|item| {
            item.as_str()
                .or_else(|| item.get("topic").and_then(|v| v.as_str()))
                .or_else(|| item.get("phrase").and_then(|v| v.as_str()))
                .or_else(|| item.get("name").and_then(|v| v.as_str()))
        })
        .collect();
    if names.is_empty() { None } else { Some(names.join(", ")) }
}
