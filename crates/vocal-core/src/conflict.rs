//! Conflict detection between a candidate event and existing calendar
//! entries.
//!
//! This is a pure function over inputs the orchestrator provides; it never
//! queries the calendar capability itself, which keeps it testable without
//! network or browser access.

use crate::event::{EventRequest, ExistingEvent};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One detected overlap between the candidate event and an existing
/// calendar entry. At most one is surfaced per turn even when several
/// exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Title of the existing event that overlaps.
    pub conflicting_title: String,
    /// Start of the existing event.
    pub conflicting_start: NaiveDateTime,
}

/// Checks the candidate event against existing entries.
///
/// An event conflicts when its `[start, start + duration)` interval
/// intersects an existing event's `[start, end)` interval. Both intervals
/// are half-open, so touching endpoints do not conflict.
///
/// When several existing events overlap, the one with the earliest start
/// is reported. That tie-break is a determinism choice (same inputs, same
/// output), not a correctness requirement.
pub fn find_conflict(
    candidate: &EventRequest,
    existing: &[ExistingEvent],
) -> Option<ConflictRecord> {
    let candidate_end = candidate.end();

    existing
        .iter()
        .filter(|event| candidate.start < event.end && event.start < candidate_end)
        .min_by_key(|event| event.start)
        .map(|event| ConflictRecord {
            conflicting_title: event.title.clone(),
            conflicting_start: event.start,
        })
}
