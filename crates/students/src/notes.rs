use std::{
    fs,
    path::{Path, PathBuf},
};

use {
    async_trait::async_trait,
    chrono::NaiveDate,
    serde::Serialize,
    tracing::{debug, warn},
};

use tutorbot_common::types::normalize_name;

use crate::{Context, Error, Result};

/// A dated free-text note a teacher wrote about one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherNote {
    pub student_name: String,
    pub date: NaiveDate,
    pub text: String,
}

/// Teacher note storage.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Notes about one student, oldest first.
    async fn notes_for(&self, name: &str) -> Result<Vec<TeacherNote>>;
    /// Every note, ordered by student then date.
    async fn all_notes(&self) -> Result<Vec<TeacherNote>>;
    /// Write (or replace) the note for `name` on `date`. Returns the file path.
    async fn write_note(&self, name: &str, date: NaiveDate, text: &str) -> Result<PathBuf>;
}

/// Notes as `<dir>/<name>_<YYYY-MM-DD>.txt`.
pub struct FsNoteStore {
    dir: PathBuf,
}

impl FsNoteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load(&self) -> Result<Vec<TeacherNote>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || load_blocking(&dir)).await?
    }
}

/// Split `吳志強_2025-05-01.txt` into name and date.
fn parse_file_name(file_name: &str) -> Option<(String, NaiveDate)> {
    let stem = file_name.strip_suffix(".txt")?;
    let (name, date) = stem.rsplit_once('_')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), date))
}

fn load_blocking(dir: &Path) -> Result<Vec<TeacherNote>> {
    // No notes written yet is the normal state of a fresh deployment.
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| Error::unavailable(dir, e))?;
    let mut notes = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let Some((student_name, date)) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_file_name)
        else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(text) => notes.push(TeacherNote {
                student_name,
                date,
                text: text.trim().to_string(),
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable note"),
        }
    }
    notes.sort_by(|a, b| {
        a.student_name
            .cmp(&b.student_name)
            .then(a.date.cmp(&b.date))
    });
    Ok(notes)
}

#[async_trait]
impl NoteStore for FsNoteStore {
    async fn notes_for(&self, name: &str) -> Result<Vec<TeacherNote>> {
        let wanted = normalize_name(name);
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|n| normalize_name(&n.student_name) == wanted)
            .collect())
    }

    async fn all_notes(&self) -> Result<Vec<TeacherNote>> {
        self.load().await
    }

    async fn write_note(&self, name: &str, date: NaiveDate, text: &str) -> Result<PathBuf> {
        let name = normalize_name(name);
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(Error::InvalidName(name));
        }
        let path = self
            .dir
            .join(format!("{name}_{}.txt", date.format("%Y-%m-%d")));
        let dir = self.dir.clone();
        let text = text.to_string();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            fs::write(&target, text).with_context(|| format!("writing {}", target.display()))?;
            Ok(())
        })
        .await??;
        debug!(path = %path.display(), "saved teacher note");
        Ok(path)
    }
}
