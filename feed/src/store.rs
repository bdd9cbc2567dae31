use crate::error::{FeedError, FeedResult};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// String-keyed storage of JSON blobs that survives restarts on this device.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> FeedResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> FeedResult<()>;
}

/// On-disk store backed by sled.
pub struct SledStore {
    pub root: PathBuf,
    db: sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        // every write flushes, so no background flusher
        let db = sled::Config::new().path(root.join("local.sled")).flush_every_ms(None).open()?;
        Ok(Self { root, db })
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &str) -> FeedResult<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| FeedError::Storage(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> FeedResult<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-process store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> FeedResult<Option<String>> { Ok(self.map.read().get(key).cloned()) }

    fn set(&self, key: &str, value: &str) -> FeedResult<()> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
