//! Recently printed labels.
//!
//! The list is ordered most recent first and holds at most one entry per
//! distinct label configuration. Every change is written straight back to a
//! JSON file; if that write fails the in-memory list is still used for the
//! rest of the process. Items in the file that do not decode are skipped on
//! load and are not written back.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{error::PersistenceError, model::Alignment, model::LabelRequest};

/// A label configuration that was printed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLabel {
    pub id: String,
    pub text: String,
    pub label_size: String,
    pub font_size: u32,
    pub align: Alignment,
    pub copies: u32,
}

/// Fields that decide whether two saves describe the same label.
#[derive(Debug, PartialEq, Eq)]
struct DedupKey<'a> {
    text: &'a str,
    label_size: &'a str,
    font_size: u32,
    align: Alignment,
    copies: u32,
}

impl SavedLabel {
    fn from_request(request: &LabelRequest) -> Self {
        SavedLabel {
            id: Uuid::new_v4().simple().to_string(),
            text: request.text.clone(),
            label_size: request.label_size.clone(),
            font_size: request.font_size,
            align: request.align,
            copies: request.copies,
        }
    }

    fn key(&self) -> DedupKey<'_> {
        DedupKey {
            text: &self.text,
            label_size: &self.label_size,
            font_size: self.font_size,
            align: self.align,
            copies: self.copies,
        }
    }

    /// Turn the saved entry back into a request, e.g. to print it again.
    pub fn to_request(&self) -> LabelRequest {
        LabelRequest {
            text: self.text.clone(),
            label_size: self.label_size.clone(),
            font_size: self.font_size,
            align: self.align,
            copies: self.copies,
        }
    }
}

/// Ordered, deduplicated list of saved labels backed by a JSON file.
#[derive(Debug)]
pub struct RecencyStore {
    path: PathBuf,
    entries: Vec<SavedLabel>,
}

impl RecencyStore {
    /// Open the store at `path`.
    ///
    /// A missing, unreadable or malformed file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load(&path) {
            Ok(entries) => {
                info!("loaded {} saved labels from {}", entries.len(), path.display());
                entries
            }
            Err(PersistenceError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", path.display());
                Vec::new()
            }
            Err(err) => {
                warn!("ignoring saved labels in {}: {}", path.display(), err);
                Vec::new()
            }
        };
        RecencyStore { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved labels, most recent first.
    pub fn list(&self) -> &[SavedLabel] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedLabel> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Record `request` at the front of the list.
    ///
    /// An existing entry with the same text, size, font size, alignment and
    /// copies is dropped first, so the new entry always gets a fresh id.
    pub fn save(&mut self, request: &LabelRequest) -> SavedLabel {
        let entry = SavedLabel::from_request(request);
        let before = self.entries.len();
        self.entries.retain(|existing| existing.key() != entry.key());
        if self.entries.len() != before {
            debug!("replacing saved label {:?}", entry.text);
        }
        self.entries.insert(0, entry.clone());
        self.persist();
        entry
    }

    /// Remove every entry whose id is in `ids`. Unknown ids are ignored.
    pub fn delete(&mut self, ids: &HashSet<String>) -> &[SavedLabel] {
        let before = self.entries.len();
        self.entries.retain(|entry| !ids.contains(&entry.id));
        debug!("deleted {} saved labels", before - self.entries.len());
        self.persist();
        &self.entries
    }

    fn persist(&self) {
        if let Err(err) = store(&self.path, &self.entries) {
            warn!(
                "could not write saved labels to {}: {}",
                self.path.display(),
                err
            );
        }
    }
}

fn load(path: &Path) -> Result<Vec<SavedLabel>, PersistenceError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => return Err(PersistenceError::NotAList),
    };

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<SavedLabel>(item) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(
                "skipping malformed saved label in {}, it will be dropped from the file on the next change: {}",
                path.display(),
                err
            ),
        }
    }
    Ok(entries)
}

/// Write `entries` next to `path` and move the result into place.
fn store(path: &Path, entries: &[SavedLabel]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
