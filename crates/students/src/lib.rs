//! Student data collaborators: tabular score rows, teacher notes, and name
//! matching.
//!
//! Score data lives in a directory of `*.json` files, each an array of row
//! objects keyed by column name. Notes are plain text files named
//! `<student>_<YYYY-MM-DD>.txt`.

pub mod directory;
pub mod error;
pub mod matching;
pub mod notes;

pub use {
    directory::{FsStudentDirectory, StudentDirectory},
    error::{Context, Error, Result},
    matching::{closest_match, similarity},
    notes::{FsNoteStore, NoteStore, TeacherNote},
};
