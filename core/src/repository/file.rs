use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use serde_json;

use crate::error::CoreError;
use crate::model::entry::DoseEntry;
use crate::repository::traits::DoseEntryRepository;

const DEFAULT_FILE_NAME: &str = "doses.json";

/// Entries accumulate for years on a hobby system; cap the store so the
/// whole-file rewrite stays cheap.
pub const DEFAULT_MAX_ENTRIES: usize = 5000;

/// File-backed dose log: one pretty-printed JSON array, read and
/// rewritten wholesale on every mutation. There is no locking; when two
/// writers race, the later full-file write wins.
#[derive(Clone)]
pub struct FileDoseEntryRepository {
    file_path: PathBuf,
    max_entries: usize,
}

impl FileDoseEntryRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self, CoreError> {
        Self::with_max_entries(base_dir, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(
        base_dir: Option<PathBuf>,
        max_entries: usize,
    ) -> Result<Self, CoreError> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| CoreError::Other("could not determine home directory".into()))?;
                home_dir.join(".onefarmer")
            }
        };
        fs::create_dir_all(&path)?; // Ensure the directory exists
        path.push(DEFAULT_FILE_NAME);

        Ok(FileDoseEntryRepository { file_path: path, max_entries })
    }

    fn read_entries(&self) -> Result<Vec<DoseEntry>, CoreError> {
        // First run: no backing file yet means an empty store
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let entries = serde_json::from_reader(reader)?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &[DoseEntry]) -> Result<(), CoreError> {
        let file = File::create(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.flush()?;
        Ok(())
    }
}

impl DoseEntryRepository for FileDoseEntryRepository {
    fn append(&self, entry: DoseEntry) -> Result<DoseEntry, CoreError> {
        let mut entries = self.read_entries()?;
        // Same (date, time) replaces rather than duplicates
        entries.retain(|e| e.key() != entry.key());
        entries.push(entry.clone());
        entries.sort_by_key(|e| e.timestamp());
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
        }
        self.write_entries(&entries)?;
        Ok(entry)
    }

    fn list(&self) -> Result<Vec<DoseEntry>, CoreError> {
        self.read_entries()
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.write_entries(&[])
    }
}
