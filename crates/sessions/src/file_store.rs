use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use {async_trait::async_trait, fd_lock::RwLock, tracing::debug};

use crate::{
    Error, Result,
    binding::{BindingRecord, BindingStore},
};

type BindingMap = BTreeMap<String, BindingRecord>;

/// JSON-file binding store.
///
/// The whole file is read on every lookup and rewritten on every mutation.
/// Mutations hold an exclusive `fd-lock` for the full read-modify-write, so
/// two processes sharing the file cannot interleave a rewrite.
pub struct JsonFileBindingStore {
    path: PathBuf,
}

impl JsonFileBindingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BindingMap> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<BindingMap> {
            if !path.exists() {
                return Ok(BindingMap::new());
            }
            let file = File::open(&path)?;
            let lock = RwLock::new(file);
            let guard = lock
                .read()
                .map_err(|e| Error::lock_failed(e.to_string()))?;
            let mut raw = String::new();
            (&*guard).read_to_string(&mut raw)?;
            parse(&raw)
        })
        .await?
    }

    async fn mutate<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut BindingMap) -> R + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<R> {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&path)?;
            let mut lock = RwLock::new(file);
            let mut guard = lock
                .write()
                .map_err(|e| Error::lock_failed(e.to_string()))?;

            let mut raw = String::new();
            guard.read_to_string(&mut raw)?;
            let mut map = parse(&raw)?;
            let out = f(&mut map);

            let json = serde_json::to_string_pretty(&map)?;
            guard.set_len(0)?;
            guard.seek(SeekFrom::Start(0))?;
            guard.write_all(json.as_bytes())?;
            guard.write_all(b"\n")?;
            guard.sync_data()?;
            debug!(path = %path.display(), entries = map.len(), "rewrote binding file");
            Ok(out)
        })
        .await?
    }
}

fn parse(raw: &str) -> Result<BindingMap> {
    if raw.trim().is_empty() {
        return Ok(BindingMap::new());
    }
    Ok(serde_json::from_str(raw)?)
}

#[async_trait]
impl BindingStore for JsonFileBindingStore {
    async fn get(&self, identity: &str) -> Result<Option<BindingRecord>> {
        Ok(self.read_all().await?.remove(identity))
    }

    async fn put(&self, identity: &str, student_id: &str, student_name: &str) -> Result<()> {
        let identity = identity.to_string();
        let record = BindingRecord::new(student_id, student_name);
        self.mutate(move |map| {
            map.insert(identity, record);
        })
        .await
    }

    async fn remove(&self, identity: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let identity = identity.to_string();
        self.mutate(move |map| map.remove(&identity).is_some())
            .await
    }

    async fn list(&self) -> Result<Vec<(String, BindingRecord)>> {
        Ok(self.read_all().await?.into_iter().collect())
    }
}
