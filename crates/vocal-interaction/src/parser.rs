//! The external parsing capability seam.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use vocal_core::{Language, PartialFields, Result};

/// Maps a transcript plus context into structured schedule fields.
///
/// Implementations receive the anchor date/time of the current turn so
/// relative expressions ("tomorrow", "next Monday") resolve against the
/// moment the user spoke, and a short context line describing the pending
/// draft so follow-up turns combine with earlier ones.
///
/// Failures surface as [`vocal_core::VocalError::ParseUnavailable`]; the
/// orchestrator never mutates the draft on that outcome.
#[async_trait]
pub trait ScheduleParser: Send + Sync {
    /// Extracts zero or more schedule fields from `transcript`.
    async fn parse(
        &self,
        transcript: &str,
        language: Language,
        anchor: NaiveDateTime,
        context: &str,
    ) -> Result<PartialFields>;
}
