//! In-memory state for the live environmental feed.
//!
//! One explicitly owned holder, created at startup and injected where
//! needed; the MQTT side pushes readings in, the HTTP side polls a
//! snapshot out. Nothing here touches disk.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

pub const DEFAULT_CAPACITY: usize = 1000;

/// Connectivity of the upstream feed, tracked as a flag rather than
/// surfaced as errors.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Connected,
    Connecting,
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub metric: String,
    pub value: f64,
    pub received_at: DateTime<Utc>,
}

/// Point-in-time view served to pollers.
#[derive(Serialize, Debug, Clone)]
pub struct FeedSnapshot {
    pub status: FeedStatus,
    pub latest: BTreeMap<String, SensorReading>,
    pub last_message_at: Option<DateTime<Utc>>,
}

pub struct FeedState {
    latest: BTreeMap<String, SensorReading>,
    recent: VecDeque<SensorReading>,
    status: FeedStatus,
    last_message_at: Option<DateTime<Utc>>,
    capacity: usize,
}

impl FeedState {
    pub fn new(capacity: usize) -> Self {
        Self {
            latest: BTreeMap::new(),
            recent: VecDeque::with_capacity(capacity),
            status: FeedStatus::Connecting,
            last_message_at: None,
            capacity,
        }
    }

    pub fn record(&mut self, metric: &str, value: f64) {
        self.record_at(metric, value, Utc::now());
    }

    pub fn record_at(&mut self, metric: &str, value: f64, now: DateTime<Utc>) {
        let reading = SensorReading {
            metric: metric.to_string(),
            value,
            received_at: now,
        };
        self.latest.insert(metric.to_string(), reading.clone());
        self.recent.push_back(reading);
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
        self.last_message_at = Some(now);
        self.status = FeedStatus::Connected;
    }

    pub fn set_status(&mut self, status: FeedStatus) {
        self.status = status;
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn recent(&self) -> impl Iterator<Item = &SensorReading> {
        self.recent.iter()
    }

    /// Health check run on each poll: a connected feed with no traffic
    /// inside the staleness window is downgraded to `Connecting` so the
    /// dashboard stops showing readings as live. The event loop flips
    /// it back on the next message.
    pub fn check_staleness(&mut self, stale_after: Duration, now: DateTime<Utc>) -> FeedStatus {
        if self.status == FeedStatus::Connected {
            let stale = match self.last_message_at {
                Some(at) => now - at > stale_after,
                None => true,
            };
            if stale {
                self.status = FeedStatus::Connecting;
            }
        }
        self.status
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            status: self.status,
            latest: self.latest.clone(),
            last_message_at: self.last_message_at,
        }
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_717_200_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_latest_tracks_most_recent_per_metric() {
        let mut feed = FeedState::new(10);
        feed.record_at("water_temp", 19.5, at(0));
        feed.record_at("water_temp", 20.1, at(30));
        feed.record_at("ph", 6.2, at(30));

        let snap = feed.snapshot();
        assert_eq!(snap.latest["water_temp"].value, 20.1);
        assert_eq!(snap.latest["ph"].value, 6.2);
        assert_eq!(snap.latest.len(), 2);
    }

    #[test]
    fn test_ring_buffer_never_exceeds_capacity() {
        let mut feed = FeedState::new(3);
        for i in 0..10 {
            feed.record_at("ph", i as f64, at(i));
        }
        assert_eq!(feed.recent().count(), 3);
        // Oldest surviving reading is the 8th
        assert_eq!(feed.recent().next().unwrap().value, 7.0);
    }

    #[test]
    fn test_recording_marks_feed_connected() {
        let mut feed = FeedState::new(10);
        assert_eq!(feed.status(), FeedStatus::Connecting);
        feed.record_at("ph", 6.0, at(0));
        assert_eq!(feed.status(), FeedStatus::Connected);
    }

    #[test]
    fn test_staleness_downgrades_connected_feed() {
        let mut feed = FeedState::new(10);
        feed.record_at("ph", 6.0, at(0));
        // Inside the window: still connected
        assert_eq!(
            feed.check_staleness(Duration::seconds(60), at(30)),
            FeedStatus::Connected
        );
        // Past the window: downgraded
        assert_eq!(
            feed.check_staleness(Duration::seconds(60), at(120)),
            FeedStatus::Connecting
        );
    }

    #[test]
    fn test_staleness_leaves_error_status_alone() {
        let mut feed = FeedState::new(10);
        feed.set_status(FeedStatus::Error);
        assert_eq!(
            feed.check_staleness(Duration::seconds(60), at(120)),
            FeedStatus::Error
        );
    }

    #[test]
    fn test_new_reading_recovers_from_staleness() {
        let mut feed = FeedState::new(10);
        feed.record_at("ph", 6.0, at(0));
        feed.check_staleness(Duration::seconds(60), at(120));
        feed.record_at("ph", 6.1, at(121));
        assert_eq!(feed.status(), FeedStatus::Connected);
    }
}
