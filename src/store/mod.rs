//! Layer store module
//!
//! Persists the layer list as a single JSON document on disk:
//!
//! ```json
//! { "layers": [ <layer>, <layer>, ... ] }
//! ```
//!
//! Every append is a full read-modify-write cycle against the file; nothing
//! is cached in memory between requests.

mod error;

pub use error::StoreError;

use serde_json::Value;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// Key holding the layer list in the store document
const LAYERS_KEY: &str = "layers";

/// JSON file backed layer list
pub struct LayerStore {
    /// Path to the store file
    path: PathBuf,
    /// Held for every file access, so readers never see a half-written document
    write_lock: Mutex<()>,
}

impl LayerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Document written when the store is first created
    pub fn empty_document() -> Value {
        serde_json::json!({ LAYERS_KEY: [] })
    }

    /// Create the store file with an empty layer list if it does not exist
    ///
    /// Existing contents are left untouched and not validated.
    /// Returns `true` when the file was created.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(file) => drop(file),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(StoreError::Io(e)),
        }

        self.save(&Self::empty_document()).await?;
        Ok(true)
    }

    /// Read and decode the whole store document
    pub async fn load(&self) -> Result<Value, StoreError> {
        let _guard = self.write_lock.lock().await;
        let contents = fs::read(&self.path)
            .await
            .map_err(|e| StoreError::from_access(&self.path, e))?;
        let mut document: Value = serde_json::from_slice(&contents)?;
        layers_mut(&mut document)?;
        Ok(document)
    }

    /// Encode and write a document, replacing the previous contents
    pub async fn save(&self, document: &Value) -> Result<(), StoreError> {
        let encoded = encode(document)?;
        let _guard = self.write_lock.lock().await;
        fs::write(&self.path, encoded).await?;
        Ok(())
    }

    /// Append one layer to the stored list
    ///
    /// Opens the file without truncation, decodes it, pushes `layer`, then
    /// rewrites from offset 0 and truncates to the new length. A fault after
    /// the rewrite has started can leave the file inconsistent; there is no
    /// rollback.
    ///
    /// Returns the number of layers after the append.
    pub async fn append(&self, layer: Value) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::from_access(&self.path, e))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        let mut document: Value = serde_json::from_slice(&contents)?;
        let layers = layers_mut(&mut document)?;
        layers.push(layer);
        let count = layers.len();

        let encoded = encode(&document)?;
        file.seek(SeekFrom::Start(0)).await?;
        file.write_all(&encoded).await?;
        file.flush().await?;
        file.set_len(encoded.len() as u64).await?;

        Ok(count)
    }
}

/// Locate the `layers` array inside a store document
fn layers_mut(document: &mut Value) -> Result<&mut Vec<Value>, StoreError> {
    document
        .get_mut(LAYERS_KEY)
        .and_then(Value::as_array_mut)
        .ok_or(StoreError::MissingLayers)
}

/// Pretty-print with 2-space indentation
fn encode(document: &Value) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(document)
        .map_err(|e| StoreError::Io(std::io::Error::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LayerStore {
        LayerStore::new(dir.path().join("layer_config.json"))
    }

    fn read_json(path: &Path) -> Value {
        let contents = std::fs::read(path).unwrap();
        serde_json::from_slice(&contents).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_exists_creates_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.ensure_exists().await.unwrap());
        assert_eq!(read_json(store.path()), json!({"layers": []}));
    }

    #[tokio::test]
    async fn test_ensure_exists_keeps_existing_data() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let existing = "{\"layers\": [{\"name\": \"A\"}], \"extra\": 1}";
        std::fs::write(store.path(), existing).unwrap();

        assert!(!store.ensure_exists().await.unwrap());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), existing);
    }

    #[tokio::test]
    async fn test_ensure_exists_does_not_validate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();

        assert!(!store.ensure_exists().await.unwrap());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "not json");
    }

    #[tokio::test]
    async fn test_append_single_layer() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().await.unwrap();

        let count = store.append(json!({"name": "A"})).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(read_json(store.path()), json!({"layers": [{"name": "A"}]}));
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().await.unwrap();

        store.append(json!({"name": "A"})).await.unwrap();
        store.append(json!({"name": "B"})).await.unwrap();

        assert_eq!(
            read_json(store.path()),
            json!({"layers": [{"name": "A"}, {"name": "B"}]})
        );
    }

    #[tokio::test]
    async fn test_append_accepts_any_json_value() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().await.unwrap();

        store.append(json!("plain string")).await.unwrap();
        store.append(json!(null)).await.unwrap();
        store.append(json!([1, 2, 3])).await.unwrap();

        assert_eq!(
            read_json(store.path()),
            json!({"layers": ["plain string", null, [1, 2, 3]]})
        );
    }

    #[tokio::test]
    async fn test_append_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"version": 2, "layers": []}"#).unwrap();

        store.append(json!({"name": "A"})).await.unwrap();
        assert_eq!(
            read_json(store.path()),
            json!({"version": 2, "layers": [{"name": "A"}]})
        );
    }

    #[tokio::test]
    async fn test_append_writes_two_space_indent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().await.unwrap();

        store.append(json!({"name": "A"})).await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("{\n  \"layers\": [\n    {\n      \"name\": \"A\""));
    }

    #[tokio::test]
    async fn test_append_truncates_longer_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        // Trailing whitespace is valid JSON and makes the old file longer
        let padded = format!("{{\"layers\": []}}{}", " ".repeat(4096));
        std::fs::write(store.path(), &padded).unwrap();

        store.append(json!({"name": "A"})).await.unwrap();

        let expected = encode(&json!({"layers": [{"name": "A"}]})).unwrap();
        let written = std::fs::read(store.path()).unwrap();
        assert!(written.len() < padded.len());
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_append_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.append(json!({"name": "A"})).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_append_empty_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();

        let err = store.append(json!({"name": "A"})).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_append_truncated_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{\"layers\": [{\"name\"").unwrap();

        let err = store.append(json!({"name": "A"})).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_append_without_layers_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"items": []}"#).unwrap();

        let err = store.append(json!({"name": "A"})).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingLayers));
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            r#"{"items": []}"#
        );
    }

    #[tokio::test]
    async fn test_append_layers_not_a_list() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"layers": {"name": "A"}}"#).unwrap();

        let err = store.append(json!({"name": "B"})).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingLayers));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_all_persisted() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));
        store.ensure_exists().await.unwrap();

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(json!({ "id": i })).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let document = read_json(store.path());
        let layers = document["layers"].as_array().unwrap();
        assert_eq!(layers.len(), 32);
        for i in 0..32 {
            assert!(layers.contains(&json!({ "id": i })), "layer {i} was lost");
        }
    }

    #[tokio::test]
    async fn test_load_returns_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().await.unwrap();
        store.append(json!({"name": "A"})).await.unwrap();

        let document = store.load().await.unwrap();
        assert_eq!(document, json!({"layers": [{"name": "A"}]}));
    }

    #[tokio::test]
    async fn test_load_rejects_missing_layers() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "[]").unwrap();

        assert!(matches!(
            store.load().await.unwrap_err(),
            StoreError::MissingLayers
        ));
    }
}
