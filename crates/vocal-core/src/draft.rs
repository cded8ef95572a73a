//! Event draft accumulation.
//!
//! An [`EventDraft`] is the in-progress representation of an event being
//! scheduled across multiple dialogue turns. Fields accumulate
//! monotonically: a turn that does not mention a field never erases it,
//! while a turn that re-states a field with a new value is treated as a
//! user correction and overwrites it.

use crate::event::EventRequest;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::Display;

/// One named slot of an event that extraction attempts to fill.
///
/// Duration is intentionally absent: it always has a usable value once the
/// other fields are present (the policy default), so it is never "missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SlotField {
    /// The name/description of the event.
    Title,
    /// The calendar date of the event.
    Date,
    /// The time of day the event starts.
    StartTime,
}

/// Fields extracted from a single transcript by the parsing capability.
///
/// Every field is optional; only present fields participate in
/// [`EventDraft::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialFields {
    /// Extracted event title, if the transcript mentioned one.
    pub title: Option<String>,
    /// Extracted calendar date, already resolved against the turn anchor.
    pub date: Option<NaiveDate>,
    /// Extracted start time of day.
    pub start_time: Option<NaiveTime>,
    /// Extracted duration in minutes (e.g. from "for 2 hours").
    pub duration_minutes: Option<u32>,
    /// Set when the parser judged the transcript to start an unrelated
    /// new booking rather than continue the pending one.
    #[serde(default)]
    pub new_request: bool,
}

impl PartialFields {
    /// Returns true when no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.start_time.is_none()
            && self.duration_minutes.is_none()
    }

    /// Drops the title, keeping only date/time/duration fields.
    ///
    /// Used during conflict renegotiation so a "how about 3pm" turn can
    /// never rename the event being rescheduled.
    pub fn time_only(mut self) -> Self {
        self.title = None;
        self
    }
}

/// The structured representation of a candidate calendar event plus its
/// completeness state.
///
/// Created empty at the start of a booking attempt, updated value-by-value
/// as turns arrive, replaced wholesale when the user starts an unrelated
/// request, and discarded on commit or cancellation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title, once known.
    pub title: Option<String>,
    /// Event date, once known.
    pub date: Option<NaiveDate>,
    /// Start time of day, once known.
    pub start_time: Option<NaiveTime>,
    /// Duration in minutes, if the user specified one. When absent the
    /// policy default applies at finalization.
    pub duration_minutes: Option<u32>,
}

impl EventDraft {
    /// Creates an empty draft for a fresh booking attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the fields present in `partial`, returning the updated
    /// draft. Absent fields never overwrite existing values; present
    /// fields always do (the correction path).
    #[must_use]
    pub fn merge(&self, partial: &PartialFields) -> Self {
        Self {
            title: partial.title.clone().or_else(|| self.title.clone()),
            date: partial.date.or(self.date),
            start_time: partial.start_time.or(self.start_time),
            duration_minutes: partial.duration_minutes.or(self.duration_minutes),
        }
    }

    /// Returns the slots still required before the draft can be
    /// scheduled, in stable prompt order.
    ///
    /// This is the single source of truth for completeness; no other
    /// component re-derives it.
    pub fn missing(&self) -> Vec<SlotField> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push(SlotField::Title);
        }
        if self.date.is_none() {
            missing.push(SlotField::Date);
        }
        if self.start_time.is_none() {
            missing.push(SlotField::StartTime);
        }
        missing
    }

    /// Returns true once title, date, and start time are all present.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Produces the concrete event request once the draft is complete,
    /// falling back to `default_duration_minutes` when the user never
    /// specified a duration.
    pub fn finalize(&self, default_duration_minutes: u32) -> Option<EventRequest> {
        let title = self.title.clone()?;
        let date = self.date?;
        let start_time = self.start_time?;
        Some(EventRequest {
            title,
            start: date.and_time(start_time),
            duration_minutes: self.duration_minutes.unwrap_or(default_duration_minutes),
        })
    }
}
