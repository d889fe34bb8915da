//! History log and favorites, persisted through a [`KeyValueStore`].
//!
//! History is newest-first and capped at [`HISTORY_LIMIT`]. Favorites are
//! unbounded and keyed by record `id`. A failed write is logged and the store
//! keeps working from memory for the rest of the session. A stored collection
//! that could not be read in full is never overwritten, only cleared on request.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::record::SummaryRecord;
use crate::storage::{FAVORITES_KEY, HISTORY_KEY, KeyValueStore};

/// Maximum number of history entries kept
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug)]
pub struct HistoryStore<S> {
    backend: S,
    history: Vec<SummaryRecord>,
    favorites: Vec<SummaryRecord>,
    persistent: bool,
    history_locked: bool,
    favorites_locked: bool,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Read both collections; absent or unreadable values yield empty collections.
    pub fn load_all(backend: S) -> Self {
        let (history, history_complete) = load_collection(&backend, HISTORY_KEY);
        let (favorites, favorites_complete) = load_collection(&backend, FAVORITES_KEY);
        debug!(
            "Loaded {} history entries and {} favorites",
            history.len(),
            favorites.len()
        );
        Self {
            backend,
            history,
            favorites,
            persistent: true,
            history_locked: !history_complete,
            favorites_locked: !favorites_complete,
        }
    }

    pub fn history(&self) -> &[SummaryRecord] {
        &self.history
    }

    pub fn favorites(&self) -> &[SummaryRecord] {
        &self.favorites
    }

    /// False once a write has failed this session
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Prepend a record, dropping the oldest entries beyond the limit.
    pub fn append_history(&mut self, record: SummaryRecord) {
        self.history.insert(0, record);
        self.history.truncate(HISTORY_LIMIT);
        self.save(HISTORY_KEY);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.discard(HISTORY_KEY);
    }

    /// Add the record to favorites if its id is absent, remove it otherwise.
    ///
    /// Returns whether the record is a favorite afterwards.
    pub fn toggle_favorite(&mut self, record: &SummaryRecord) -> bool {
        let now_favorite = if self.is_favorite(&record.id) {
            self.favorites.retain(|fav| fav.id != record.id);
            false
        } else {
            let mut fav = record.clone();
            fav.favorited_at = Some(Utc::now());
            self.favorites.push(fav);
            true
        };
        self.save(FAVORITES_KEY);
        now_favorite
    }

    pub fn clear_favorites(&mut self) {
        self.favorites.clear();
        self.discard(FAVORITES_KEY);
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|fav| fav.id == id)
    }

    /// Look a record up by id, history first
    pub fn find(&self, id: &str) -> Option<&SummaryRecord> {
        self.history
            .iter()
            .chain(self.favorites.iter())
            .find(|record| record.id == id)
    }

    /// Millisecond timestamp id, bumped past every numeric id already stored
    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let newest = self
            .history
            .iter()
            .chain(self.favorites.iter())
            .filter_map(|record| record.id.parse::<i64>().ok())
            .max();
        let candidate = now.timestamp_millis();
        match newest {
            Some(newest) if newest >= candidate => match newest.checked_add(1) {
                Some(next) => next.to_string(),
                // no numeric successor left, step outside the numeric id space
                None => (0u64..)
                    .map(|n| format!("{candidate}-{n}"))
                    .find(|id| self.find(id).is_none())
                    .unwrap_or_else(|| candidate.to_string()),
            },
            _ => candidate.to_string(),
        }
    }

    /// Give the backing store back, e.g. to reload it
    pub fn into_backend(self) -> S {
        self.backend
    }

    fn save(&mut self, key: &str) {
        if !self.persistent {
            return;
        }
        if self.is_locked(key) {
            warn!("Not overwriting {key}: it holds entries that could not be read");
            return;
        }
        let records = if key == HISTORY_KEY {
            &self.history
        } else {
            &self.favorites
        };
        let result = serde_json::to_string(records)
            .map_err(eyre::Report::from)
            .and_then(|data| self.backend.set(key, &data));
        if let Err(e) = result {
            self.degrade(key, e);
        }
    }

    fn discard(&mut self, key: &str) {
        if !self.persistent {
            return;
        }
        match self.backend.remove(key) {
            Ok(()) => self.unlock(key),
            Err(e) => self.degrade(key, e),
        }
    }

    fn is_locked(&self, key: &str) -> bool {
        if key == HISTORY_KEY {
            self.history_locked
        } else {
            self.favorites_locked
        }
    }

    fn unlock(&mut self, key: &str) {
        if key == HISTORY_KEY {
            self.history_locked = false;
        } else {
            self.favorites_locked = false;
        }
    }

    fn degrade(&mut self, key: &str, e: eyre::Report) {
        warn!("Failed to persist {key}: {e}; keeping summaries in memory for this session");
        self.persistent = false;
    }
}

/// Parse each stored entry on its own; the flag is false if anything was skipped.
fn load_collection<S: KeyValueStore>(backend: &S, key: &str) -> (Vec<SummaryRecord>, bool) {
    let data = match backend.get(key) {
        Ok(Some(data)) => data,
        Ok(None) => return (Vec::new(), true),
        Err(e) => {
            warn!("Failed to read {key}: {e}");
            return (Vec::new(), false);
        }
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(&data) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Ignoring unreadable {key}: {e}");
            return (Vec::new(), false);
        }
    };

    let total = entries.len();
    let records: Vec<SummaryRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            serde_json::from_value(entry)
                .map_err(|e| warn!("Skipping unreadable entry {i} of {key}: {e}"))
                .ok()
        })
        .collect();
    let complete = records.len() == total;
    (records, complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::{SummaryLength, SummaryStyle};

    fn record(id: &str, summary: &str) -> SummaryRecord {
        SummaryRecord {
            id: id.to_string(),
            url: format!("https://youtu.be/{id}"),
            summary: summary.to_string(),
            video_info: None,
            summary_length: SummaryLength::Medium,
            summary_style: SummaryStyle::Paragraph,
            analysis: None,
            timestamp: Utc::now(),
            favorited_at: None,
        }
    }

    /// Store whose writes always fail
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> eyre::Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> eyre::Result<()> {
            eyre::bail!("quota exceeded")
        }

        fn remove(&mut self, _key: &str) -> eyre::Result<()> {
            eyre::bail!("quota exceeded")
        }
    }

    #[test]
    fn test_load_empty_store() {
        let store = HistoryStore::load_all(MemoryStore::new());
        assert!(store.history().is_empty());
        assert!(store.favorites().is_empty());
        assert!(store.is_persistent());
    }

    #[test]
    fn test_load_corrupt_value_is_empty() {
        let mut backend = MemoryStore::new();
        backend.set(HISTORY_KEY, "{not json").unwrap();
        let store = HistoryStore::load_all(backend);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_append_prepends_and_persists() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        store.append_history(record("1", "first"));
        store.append_history(record("2", "second"));
        assert_eq!(store.history()[0].id, "2");
        assert_eq!(store.history()[1].id, "1");

        let reloaded = HistoryStore::load_all(store.into_backend());
        assert_eq!(reloaded.history().len(), 2);
        assert_eq!(reloaded.history()[0].summary, "second");
    }

    #[test]
    fn test_history_capped_at_limit() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        for i in 0..HISTORY_LIMIT + 5 {
            store.append_history(record(&i.to_string(), "s"));
        }
        assert_eq!(store.history().len(), HISTORY_LIMIT);
        assert_eq!(store.history()[0].id, (HISTORY_LIMIT + 4).to_string());
        // oldest five dropped
        assert_eq!(store.history()[HISTORY_LIMIT - 1].id, "5");
    }

    #[test]
    fn test_clear_history_then_reload() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        store.append_history(record("1", "first"));
        store.clear_history();
        assert!(store.history().is_empty());

        let backend = store.into_backend();
        assert_eq!(backend.get(HISTORY_KEY).unwrap(), None);
        let reloaded = HistoryStore::load_all(backend);
        assert!(reloaded.history().is_empty());
    }

    #[test]
    fn test_toggle_favorite_by_id() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        let a = record("1", "same text");
        let b = record("2", "same text");

        assert!(store.toggle_favorite(&a));
        assert!(store.toggle_favorite(&b));
        assert_eq!(store.favorites().len(), 2);
        assert!(store.favorites()[0].favorited_at.is_some());

        assert!(!store.toggle_favorite(&a));
        assert!(!store.is_favorite("1"));
        assert!(store.is_favorite("2"));
    }

    #[test]
    fn test_favorites_survive_history_clear() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        let a = record("1", "keep me");
        store.append_history(a.clone());
        store.toggle_favorite(&a);
        store.clear_history();

        let reloaded = HistoryStore::load_all(store.into_backend());
        assert!(reloaded.history().is_empty());
        assert_eq!(reloaded.favorites().len(), 1);
        assert_eq!(reloaded.find("1").map(|r| r.summary.as_str()), Some("keep me"));
    }

    #[test]
    fn test_clear_favorites() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        store.toggle_favorite(&record("1", "x"));
        store.clear_favorites();
        assert!(store.favorites().is_empty());
        let reloaded = HistoryStore::load_all(store.into_backend());
        assert!(reloaded.favorites().is_empty());
    }

    #[test]
    fn test_next_id_is_unique() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        let now = Utc::now();
        let first = store.next_id(now);
        assert_eq!(first, now.timestamp_millis().to_string());

        store.append_history(record(&first, "s"));
        let second = store.next_id(now);
        assert_ne!(first, second);
        assert_eq!(second, (now.timestamp_millis() + 1).to_string());
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let mut store = HistoryStore::load_all(ReadOnlyStore(MemoryStore::new()));
        store.append_history(record("1", "first"));
        assert!(!store.is_persistent());
        assert_eq!(store.history().len(), 1);

        store.append_history(record("2", "second"));
        store.toggle_favorite(&record("2", "second"));
        assert_eq!(store.history().len(), 2);
        assert_eq!(store.favorites().len(), 1);
    }

    /// Shape written by the dashboard's favorite button: no `url`, no `summaryStyle`
    const DASHBOARD_FAVORITES: &str = r#"[{
        "id": "1718000000000",
        "summary": "A test summary.",
        "videoInfo": {"video_id": "dQw4w9WgXcQ", "language": "en"},
        "summaryLength": "medium",
        "timestamp": "2024-06-10T06:13:20.000Z",
        "favoritedAt": "2024-06-10T06:13:20.000Z"
    }]"#;

    #[test]
    fn test_dashboard_favorites_load_and_survive_toggle() {
        let mut backend = MemoryStore::new();
        backend.set(FAVORITES_KEY, DASHBOARD_FAVORITES).unwrap();

        let mut store = HistoryStore::load_all(backend);
        assert_eq!(store.favorites().len(), 1);
        assert_eq!(store.favorites()[0].url, "");
        assert_eq!(store.favorites()[0].summary_style, SummaryStyle::Paragraph);

        assert!(store.toggle_favorite(&record("2", "new")));
        let reloaded = HistoryStore::load_all(store.into_backend());
        let ids: Vec<_> = reloaded.favorites().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1718000000000", "2"]);
    }

    #[test]
    fn test_unreadable_entry_is_skipped_and_not_overwritten() {
        let stored = r#"[
            {"id": "1", "summary": "good", "timestamp": "2024-06-10T06:13:20.000Z"},
            {"id": "2", "summary": 42}
        ]"#;
        let mut backend = MemoryStore::new();
        backend.set(FAVORITES_KEY, stored).unwrap();

        let mut store = HistoryStore::load_all(backend);
        assert_eq!(store.favorites().len(), 1);
        assert_eq!(store.favorites()[0].summary, "good");

        store.toggle_favorite(&record("3", "new"));
        assert_eq!(store.favorites().len(), 2);
        // the stored value is left as it was
        let backend = store.into_backend();
        assert_eq!(backend.get(FAVORITES_KEY).unwrap().as_deref(), Some(stored));
    }

    #[test]
    fn test_clear_releases_unreadable_collection() {
        let mut backend = MemoryStore::new();
        backend.set(HISTORY_KEY, "{not json").unwrap();

        let mut store = HistoryStore::load_all(backend);
        store.append_history(record("1", "kept in memory"));
        store.clear_history();
        store.append_history(record("2", "persisted"));

        let reloaded = HistoryStore::load_all(store.into_backend());
        assert_eq!(reloaded.history().len(), 1);
        assert_eq!(reloaded.history()[0].id, "2");
    }

    #[test]
    fn test_next_id_past_largest_numeric_id() {
        let mut store = HistoryStore::load_all(MemoryStore::new());
        store.append_history(record(&i64::MAX.to_string(), "edited by hand"));

        let now = Utc::now();
        let first = store.next_id(now);
        assert_eq!(first, format!("{}-0", now.timestamp_millis()));

        store.append_history(record(&first, "s"));
        let second = store.next_id(now);
        assert_eq!(second, format!("{}-1", now.timestamp_millis()));
    }
}
