use crate::calc::{concentrations, DoseAmounts};
use crate::error::CoreError;
use crate::model::entry::{parse_hm_time, DoseEntry, NewDoseEntry};
use crate::repository::DoseEntryRepository;
use chrono::NaiveDate;

pub struct DoseService<R: DoseEntryRepository> {
    repo: R,
}

impl<R: DoseEntryRepository> DoseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validate the request, derive the elemental concentrations, and
    /// append the finished entry to the store. Date and time are the
    /// only required fields; a missing or unusable volume just records
    /// an empty concentration map.
    pub fn record_dose(&self, new: NewDoseEntry) -> Result<DoseEntry, CoreError> {
        let date = new
            .date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::validation("date is required"))?;
        let date: NaiveDate = date
            .parse()
            .map_err(|_| CoreError::validation(format!("invalid date '{}', expected YYYY-MM-DD", date)))?;

        let time = new
            .time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::validation("time is required"))?;
        let time = parse_hm_time(time).map_err(CoreError::Validation)?;

        let doses = DoseAmounts {
            masterblend: new.masterblend.unwrap_or(0.0),
            calcium_nitrate: new.calcium_nitrate.unwrap_or(0.0),
            magnesium_sulfate: new.magnesium_sulfate.unwrap_or(0.0),
        };
        let total_volume = new.total_volume.unwrap_or(0.0);

        let entry = DoseEntry {
            date,
            time,
            masterblend: doses.masterblend,
            calcium_nitrate: doses.calcium_nitrate,
            magnesium_sulfate: doses.magnesium_sulfate,
            ph_up: new.ph_up.unwrap_or(0.0),
            ph_down: new.ph_down.unwrap_or(0.0),
            total_volume,
            calculated_elements: concentrations(&doses, total_volume),
            notes: new.notes.filter(|s| !s.trim().is_empty()),
        };

        self.repo.append(entry)
    }

    pub fn list_entries(&self) -> Result<Vec<DoseEntry>, CoreError> {
        self.repo.list()
    }

    pub fn clear_entries(&self) -> Result<(), CoreError> {
        self.repo.clear()
    }
}
