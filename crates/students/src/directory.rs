use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use {
    async_trait::async_trait,
    tracing::{debug, warn},
};

use tutorbot_common::types::{StudentRecord, normalize_name};

use crate::{Context, Error, Result};

/// Student lookup over the tabular data sources.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// First row, across all sources, whose name column matches `name`.
    async fn query_student(&self, name: &str) -> Result<Option<StudentRecord>>;

    /// Every distinct student name, normalized.
    async fn all_names(&self) -> Result<Vec<String>>;

    /// Every row of every source.
    async fn all_records(&self) -> Result<Vec<StudentRecord>>;
}

/// Reads `*.json` row files from a directory, in file-name order.
///
/// Every call re-reads the directory; nothing is cached.
pub struct FsStudentDirectory {
    dir: PathBuf,
    name_column: String,
}

impl FsStudentDirectory {
    pub fn new(dir: impl Into<PathBuf>, name_column: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name_column: name_column.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    async fn load_rows(&self) -> Result<Vec<StudentRecord>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || load_rows_blocking(&dir)).await?
    }
}

fn load_rows_blocking(dir: &Path) -> Result<Vec<StudentRecord>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::unavailable(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut rows = Vec::new();
    for path in files {
        match read_source(&path) {
            Ok(mut source_rows) => {
                debug!(path = %path.display(), rows = source_rows.len(), "read data source");
                rows.append(&mut source_rows);
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable data source");
            },
        }
    }
    Ok(rows)
}

fn read_source(path: &Path) -> Result<Vec<StudentRecord>> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let rows = value
        .as_array()
        .context("top level is not an array of rows")?;
    Ok(rows.iter().filter_map(StudentRecord::from_json_row).collect())
}

#[async_trait]
impl StudentDirectory for FsStudentDirectory {
    async fn query_student(&self, name: &str) -> Result<Option<StudentRecord>> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return Ok(None);
        }
        let rows = self.load_rows().await?;
        Ok(rows.into_iter().find(|row| {
            row.get(&self.name_column)
                .is_some_and(|cell| normalize_name(cell) == wanted)
        }))
    }

    async fn all_names(&self) -> Result<Vec<String>> {
        let rows = self.load_rows().await?;
        let names: BTreeSet<String> = rows
            .iter()
            .filter_map(|row| row.get(&self.name_column))
            .map(normalize_name)
            .filter(|n| !n.is_empty())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn all_records(&self) -> Result<Vec<StudentRecord>> {
        self.load_rows().await
    }
}
