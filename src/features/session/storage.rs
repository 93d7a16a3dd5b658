/// セッションストレージモジュール
///
/// ブラウザのlocalStorageに相当するキー・バリューストア。
/// 値は文字列（JSON）として保存する。
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// セッションストレージの境界
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove_item(&self, key: &str) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

/// プロセス内のセッションストレージ
#[derive(Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| AppError::session(format!("ストレージのロック取得に失敗しました: {e}")))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// JSONファイルに永続化するセッションストレージ
pub struct FileSessionStorage {
    path: PathBuf,
    /// 読み込み・書き込みを直列化する
    guard: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> AppResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_items(&self, items: &HashMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("セッションディレクトリを作成しました: {parent:?}");
            }
        }

        fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        debug!("セッションファイルを保存しました: {:?}", self.path);
        Ok(())
    }

    fn modify<F>(&self, f: F) -> AppResult<()>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| AppError::session(format!("ストレージのロック取得に失敗しました: {e}")))?;

        let mut items = self.read_items()?;
        f(&mut items);
        self.write_items(&items)
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| AppError::session(format!("ストレージのロック取得に失敗しました: {e}")))?;

        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.modify(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> AppResult<()> {
        self.modify(|items| items.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.get_item("user").unwrap(), None);

        storage.set_item("user", r#"{"type":"Employee"}"#).unwrap();
        assert_eq!(
            storage.get_item("user").unwrap().as_deref(),
            Some(r#"{"type":"Employee"}"#)
        );

        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_between_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session.json");

        let storage = FileSessionStorage::new(&path);
        storage.set_item("user", r#"{"type":"Employee"}"#).unwrap();
        storage.set_item("jwt", "token").unwrap();
        assert!(path.exists());

        let reopened = FileSessionStorage::new(&path);
        assert_eq!(reopened.get_item("jwt").unwrap().as_deref(), Some("token"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_file_storage_clear() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp_dir.path().join("session.json"));

        storage.set_item("user", "{}").unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp_dir.path().join("absent.json"));
        assert_eq!(storage.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_file_storage_corrupted_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(matches!(storage.get_item("user"), Err(AppError::Json(_))));
    }
}
