use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::formulation::Element;

/// One recorded dosing event. Field names on disk follow the legacy
/// JSON shape (`calciumNitrate`, `totalVolume`, ...), so older store
/// files load unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoseEntry {
    pub date: NaiveDate,
    #[serde(with = "hm_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub masterblend: f64,
    #[serde(default)]
    pub calcium_nitrate: f64,
    #[serde(default)]
    pub magnesium_sulfate: f64,
    #[serde(default)]
    pub ph_up: f64,
    #[serde(default)]
    pub ph_down: f64,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub calculated_elements: BTreeMap<Element, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DoseEntry {
    /// Identity within the store: no two persisted entries share this key.
    pub fn key(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.time)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Raw create request as it arrives from the client. Everything beyond
/// date/time is optional; missing amounts mean "not dosed" rather than
/// a rejected request.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewDoseEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub masterblend: Option<f64>,
    #[serde(default)]
    pub calcium_nitrate: Option<f64>,
    #[serde(default)]
    pub magnesium_sulfate: Option<f64>,
    #[serde(default)]
    pub ph_up: Option<f64>,
    #[serde(default)]
    pub ph_down: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Times are stored as "HH:MM" (the legacy files carry no seconds).
/// "HH:MM:SS" is accepted on read but truncated to the minute, so the
/// `(date, time)` key in memory is always the one that persists.
mod hm_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse(s: &str) -> Result<NaiveTime, String> {
        let time = NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map_err(|_| format!("invalid time '{}', expected HH:MM", s))?;
        Ok(time.with_second(0).unwrap_or(time))
    }
}

pub(crate) use hm_time::parse as parse_hm_time;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DoseEntry {
        DoseEntry {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            masterblend: 2.5,
            calcium_nitrate: 1.8,
            magnesium_sulfate: 0.6,
            ph_up: 0.0,
            ph_down: 0.2,
            total_volume: 20.0,
            calculated_elements: BTreeMap::new(),
            notes: Some("weekly feed".to_string()),
        }
    }

    #[test]
    fn test_serde_field_names_match_legacy_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["time"], "08:30");
        assert_eq!(json["calciumNitrate"], 1.8);
        assert_eq!(json["magnesiumSulfate"], 0.6);
        assert_eq!(json["phDown"], 0.2);
        assert_eq!(json["totalVolume"], 20.0);
        assert_eq!(json["notes"], "weekly feed");
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let mut entry = sample();
        entry
            .calculated_elements
            .insert(Element::N, 18.95);
        let json = serde_json::to_string(&entry).unwrap();
        let back: DoseEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_missing_amounts_default_to_zero() {
        let json = r#"{"date":"2024-06-01","time":"08:30"}"#;
        let entry: DoseEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.masterblend, 0.0);
        assert_eq!(entry.total_volume, 0.0);
        assert!(entry.calculated_elements.is_empty());
        assert!(entry.notes.is_none());
    }

    #[test]
    fn test_time_with_seconds_truncated_to_minute() {
        let json = r#"{"date":"2024-06-01","time":"08:30:15"}"#;
        let entry: DoseEntry = serde_json::from_str(json).unwrap();
        // Seconds never persist, so they never enter the key either
        assert_eq!(entry.time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["time"], "08:30");
    }

    #[test]
    fn test_timestamp_combines_date_and_time() {
        let entry = sample();
        assert_eq!(
            entry.timestamp(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );
    }
}
