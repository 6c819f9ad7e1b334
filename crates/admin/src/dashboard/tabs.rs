//! Dashboard tabs and where the active one is remembered.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Inventory,
    Customers,
    Orders,
}

impl Tab {
    pub const ALL: [Self; 3] = [Self::Inventory, Self::Customers, Self::Orders];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Customers => "customers",
            Self::Orders => "orders",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| format!("unknown tab: {s}"))
    }
}

/// Errors writing the remembered tab.
#[derive(Debug, Error)]
pub enum TabStoreError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode dashboard state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence for the last active tab.
pub trait TabStore: Send + Sync {
    /// Remembered tab; anything missing or unreadable is [`Tab::Inventory`].
    fn load(&self) -> Tab;

    /// Remember `tab` for the next session.
    ///
    /// # Errors
    ///
    /// Returns [`TabStoreError`] if the tab cannot be written.
    fn save(&self, tab: Tab) -> Result<(), TabStoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    active_tab: String,
}

/// Tab store backed by a small JSON file, `{"active_tab": "orders"}`.
#[derive(Debug, Clone)]
pub struct FileTabStore {
    path: PathBuf,
}

impl FileTabStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TabStoreError {
        TabStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TabStore for FileTabStore {
    fn load(&self) -> Tab {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Tab::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read dashboard state");
                return Tab::default();
            }
        };

        match serde_json::from_str::<PersistedState>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|state| state.active_tab.parse())
        {
            Ok(tab) => tab,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring invalid dashboard state");
                Tab::default()
            }
        }
    }

    fn save(&self, tab: Tab) -> Result<(), TabStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(&PersistedState {
            active_tab: tab.as_str().to_owned(),
        })?;
        std::fs::write(&self.path, body).map_err(|e| self.io_error(e))
    }
}

/// Tab store that forgets on exit; used in tests and demo mode.
#[derive(Debug, Default)]
pub struct MemoryTabStore {
    tab: Mutex<Option<Tab>>,
}

impl MemoryTabStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store starting with `tab` already remembered.
    #[must_use]
    pub fn with_tab(tab: Tab) -> Self {
        Self {
            tab: Mutex::new(Some(tab)),
        }
    }
}

impl TabStore for MemoryTabStore {
    fn load(&self) -> Tab {
        self.tab
            .lock()
            .map(|tab| tab.unwrap_or_default())
            .unwrap_or_default()
    }

    fn save(&self, tab: Tab) -> Result<(), TabStoreError> {
        if let Ok(mut slot) = self.tab.lock() {
            *slot = Some(tab);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        FileTabStore::new(&path).save(Tab::Orders).unwrap();

        let reopened = FileTabStore::new(&path);
        assert_eq!(reopened.load(), Tab::Orders);
    }

    #[test]
    fn test_missing_file_defaults_to_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTabStore::new(dir.path().join("state.json"));
        assert_eq!(store.load(), Tab::Inventory);
    }

    #[test]
    fn test_invalid_content_defaults_to_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        std::fs::write(&path, r#"{"active_tab": "analytics"}"#).unwrap();
        assert_eq!(FileTabStore::new(&path).load(), Tab::Inventory);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileTabStore::new(&path).load(), Tab::Inventory);
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        FileTabStore::new(&path).save(Tab::Customers).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"active_tab": "customers"}));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTabStore::new();
        assert_eq!(store.load(), Tab::Inventory);
        store.save(Tab::Customers).unwrap();
        assert_eq!(store.load(), Tab::Customers);
        assert_eq!(MemoryTabStore::with_tab(Tab::Orders).load(), Tab::Orders);
    }

    #[test]
    fn test_tab_parse_is_exact() {
        assert_eq!("orders".parse::<Tab>().unwrap(), Tab::Orders);
        assert!("Orders".parse::<Tab>().is_err());
    }
}
