use crate::error::CoreError;
use crate::model::entry::DoseEntry;

pub trait DoseEntryRepository {
    /// Insert an entry, replacing any existing entry with the same
    /// `(date, time)` key, and persist the whole store.
    fn append(&self, entry: DoseEntry) -> Result<DoseEntry, CoreError>;

    /// The full store in persisted order (`append` keeps the file
    /// sorted ascending by timestamp). A store that has never been
    /// written reads as empty, not as an error.
    fn list(&self) -> Result<Vec<DoseEntry>, CoreError>;

    /// Reset the store to an empty list.
    fn clear(&self) -> Result<(), CoreError>;
}
