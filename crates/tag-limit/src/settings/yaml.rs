//! YAML file settings storage.
//!
//! All values live in a single mapping, one top-level key per setting:
//!
//! ```yaml
//! tag_limit_content_types:
//! - post
//! tag_limit_max_tags: 5
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a crash mid-write leaves the previous file intact. A missing file
//! reads as an empty mapping.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::SettingsStorage;
use crate::error::{SettingsError, SettingsResult};

/// Maximum settings file size (1 MB). Larger files are refused rather than
/// read into memory.
const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

/// Settings storage backed by one YAML file.
#[derive(Debug)]
pub struct YamlSettingsStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl YamlSettingsStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> SettingsResult<BTreeMap<String, Value>> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file missing, using empty settings");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(SettingsError::io(&self.path, e)),
        };

        if meta.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(SettingsError::TooLarge {
                path: self.path.clone(),
                size: meta.len(),
                max: MAX_SETTINGS_FILE_SIZE,
            });
        }

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SettingsError::io(&self.path, e))?;

        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_yml::from_str(&text).map_err(|e| SettingsError::yaml(&self.path, e))
    }

    async fn write_all(&self, values: &BTreeMap<String, Value>) -> SettingsResult<()> {
        let yaml = serde_yml::to_string(values).map_err(|e| SettingsError::yaml(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::io(parent, e))?;
        }

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, yaml)
            .await
            .map_err(|e| SettingsError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SettingsError::io(&self.path, e));
        }

        debug!(path = %self.path.display(), keys = values.len(), "settings file written");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl SettingsStorage for YamlSettingsStorage {
    async fn load(&self, key: &str) -> SettingsResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn save(&self, key: &str, value: Value) -> SettingsResult<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value);
        self.write_all(&values).await
    }

    async fn delete(&self, key: &str) -> SettingsResult<bool> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        if values.remove(key).is_none() {
            return Ok(false);
        }
        self.write_all(&values).await?;
        Ok(true)
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tag_limit_yaml_{}", uuid::Uuid::now_v7().simple()))
            .join(name)
    }

    #[test]
    fn tmp_path_is_sibling() {
        let tmp = tmp_path(Path::new("/etc/site/tag_limit.yml"));
        assert_eq!(tmp, PathBuf::from("/etc/site/tag_limit.yml.tmp"));
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let storage = YamlSettingsStorage::new(temp_file("absent.yml"));
        assert!(storage.load("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_file_and_parent() {
        let path = temp_file("settings.yml");
        let storage = YamlSettingsStorage::new(&path);

        storage.save("tag_limit_max_tags", json!(7)).await.unwrap();
        storage
            .save("tag_limit_content_types", json!(["post"]))
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("tag_limit_max_tags: 7"), "got: {text}");
        assert!(!tmp_path(&path).exists());

        let reopened = YamlSettingsStorage::new(&path);
        assert_eq!(
            reopened.load("tag_limit_content_types").await.unwrap(),
            Some(json!(["post"]))
        );
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        // A non-empty directory at the target path makes the rename fail.
        let path = temp_file("settings.yml");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let storage = YamlSettingsStorage::new(&path);
        let values = BTreeMap::from([("a".to_string(), json!(1))]);
        let err = storage.write_all(&values).await.unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }), "got: {err:?}");
        assert!(!tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn delete_rewrites_file() {
        let path = temp_file("settings.yml");
        let storage = YamlSettingsStorage::new(&path);
        storage.save("a", json!(1)).await.unwrap();
        storage.save("b", json!(2)).await.unwrap();

        assert!(storage.delete("a").await.unwrap());
        assert!(!storage.delete("a").await.unwrap());
        assert!(storage.load("a").await.unwrap().is_none());
        assert_eq!(storage.load("b").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn blank_file_reads_empty() {
        let path = temp_file("blank.yml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "\n  \n").unwrap();

        let storage = YamlSettingsStorage::new(&path);
        assert!(storage.load("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let path = temp_file("bad.yml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "- just\n- a list\n").unwrap();

        let storage = YamlSettingsStorage::new(&path);
        let err = storage.load("a").await.unwrap_err();
        assert!(matches!(err, SettingsError::Yaml { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn oversized_file_is_refused() {
        let path = temp_file("big.yml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let padding = "#".repeat(MAX_SETTINGS_FILE_SIZE as usize + 1);
        std::fs::write(&path, padding).unwrap();

        let storage = YamlSettingsStorage::new(&path);
        let err = storage.load("a").await.unwrap_err();
        assert!(matches!(err, SettingsError::TooLarge { .. }), "got: {err:?}");
    }
}
