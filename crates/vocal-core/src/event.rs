//! Calendar event types shared across the pipeline.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// An event already present on the user's calendar, as read back from the
/// calendar capability. Times are calendar-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingEvent {
    /// Event title as displayed on the calendar.
    pub title: String,
    /// Start of the event.
    pub start: NaiveDateTime,
    /// End of the event (exclusive).
    pub end: NaiveDateTime,
}

/// A finalized, complete event ready to be committed through the calendar
/// capability. Produced by [`crate::draft::EventDraft::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    /// Event title.
    pub title: String,
    /// Start of the event.
    pub start: NaiveDateTime,
    /// Event duration in minutes.
    pub duration_minutes: u32,
}

impl EventRequest {
    /// End of the event (exclusive), derived from start and duration.
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}
