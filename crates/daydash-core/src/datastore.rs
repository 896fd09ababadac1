use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use daydash_engine::{Store, StoreError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const STORE_FILE: &str = "dashboard.json";

/// File-backed key/value store: one JSON object of string values, rewritten
/// atomically on every change.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub store_path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let store_path = data_dir.join(STORE_FILE);
        let entries = if store_path.exists() {
            load_entries(&store_path)
                .with_context(|| format!("failed to load {}", store_path.display()))?
        } else {
            BTreeMap::new()
        };

        info!(
            data_dir = %data_dir.display(),
            store = %store_path.display(),
            keys = entries.len(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            store_path,
            entries,
        })
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    fn flush(&self, key: &str) -> Result<(), StoreError> {
        save_entries_atomic(&self.store_path, &self.entries).map_err(|err| StoreError::Write {
            key: key.to_string(),
            message: format!("{err:#}"),
        })
    }
}

impl Store for DataStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush(key) {
            // Keep memory in step with the file.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush(key) {
            self.entries.insert(key.to_string(), previous);
            return Err(match err {
                StoreError::Write { key, message } => StoreError::Remove { key, message },
                other => other,
            });
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[tracing::instrument(skip(path))]
fn load_entries(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    debug!(file = %path.display(), "loading store file");
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let entries: BTreeMap<String, String> = serde_json::from_str(&text)
        .with_context(|| format!("failed parsing {}", path.display()))?;
    debug!(count = entries.len(), "loaded store entries");
    Ok(entries)
}

#[tracing::instrument(skip(path, entries))]
fn save_entries_atomic(path: &Path, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = entries.len(), "saving store atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, entries)?;
    writeln!(temp)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn values_survive_reopen() {
        let temp = tempdir().expect("tempdir");
        let mut store = DataStore::open(temp.path()).expect("open");
        store.set("note-content-notes", "hello\nworld").expect("set");
        store.set("dashboardOrder", r#"["notes"]"#).expect("set");
        store.remove("dashboardOrder").expect("remove");
        store.remove("never-there").expect("remove missing");

        let reopened = DataStore::open(temp.path()).expect("reopen");
        assert_eq!(reopened.get("note-content-notes").as_deref(), Some("hello\nworld"));
        assert_eq!(reopened.keys(), vec!["note-content-notes".to_string()]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join(STORE_FILE), "[1, 2").expect("write");
        let err = DataStore::open(temp.path()).expect_err("corrupt store");
        assert!(format!("{err:#}").contains("failed parsing"));
    }

    #[test]
    fn remove_matching_clears_widget_keys() {
        let temp = tempdir().expect("tempdir");
        let mut store = DataStore::open(temp.path()).expect("open");
        store.set("todo-tasks-a", "[]").expect("set");
        store.set("timer-state-b", "{}").expect("set");
        store.set("theme", "dark").expect("set");

        let removed = store
            .remove_matching(&daydash_engine::store::is_widget_scoped_key)
            .expect("remove matching");
        assert_eq!(removed, 2);
        assert_eq!(
            DataStore::open(temp.path()).expect("reopen").keys(),
            vec!["theme".to_string()]
        );
    }
}
