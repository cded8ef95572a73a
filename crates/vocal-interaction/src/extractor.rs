//! Slot extraction: turns a transcript plus prior context into updated
//! draft fields via the external parsing capability.

use crate::parser::ScheduleParser;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use vocal_core::{EventDraft, Language, PartialFields, Result, VocalError};

/// Which fields a turn is allowed to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionScope {
    /// All fields (normal slot filling).
    All,
    /// Date/time/duration only; titles are dropped. Used while
    /// renegotiating a conflict so the event cannot be renamed mid-loop.
    /// A turn flagged `new_request` escapes the loop and keeps its full
    /// fields regardless.
    TimeOnly,
}

/// Wraps a [`ScheduleParser`] with draft context, call-time anchoring,
/// scope filtering, and a bounded wait.
///
/// Does not log transcript content; that is the host's concern.
pub struct SlotExtractor {
    parser: Arc<dyn ScheduleParser>,
    timeout: Duration,
}

impl SlotExtractor {
    /// Creates an extractor over the given parsing capability.
    pub fn new(parser: Arc<dyn ScheduleParser>, timeout: Duration) -> Self {
        Self { parser, timeout }
    }

    /// Extracts fields from `transcript` given the current draft.
    ///
    /// The anchor must be the moment of the current turn so relative
    /// dates resolve correctly. A timed-out or failed parse call is a
    /// `ParseUnavailable`; the caller must leave the draft untouched.
    pub async fn extract(
        &self,
        transcript: &str,
        draft: &EventDraft,
        language: Language,
        anchor: NaiveDateTime,
        scope: ExtractionScope,
    ) -> Result<PartialFields> {
        let context = draft_context(draft);

        let fields = tokio::time::timeout(
            self.timeout,
            self.parser.parse(transcript, language, anchor, &context),
        )
        .await
        .map_err(|_| VocalError::parse_unavailable("parse call timed out"))??;

        tracing::debug!(
            scope = ?scope,
            extracted_any = !fields.is_empty(),
            new_request = fields.new_request,
            "slot extraction finished"
        );

        Ok(match scope {
            ExtractionScope::All => fields,
            // An unrelated new booking replaces the draft wholesale, so
            // its title must survive even mid-renegotiation.
            ExtractionScope::TimeOnly if fields.new_request => fields,
            ExtractionScope::TimeOnly => fields.time_only(),
        })
    }
}

/// Serializes the known draft fields into the context line handed to the
/// parser, so follow-up turns like "make it 2pm" combine with earlier
/// turns. Empty when nothing is known yet.
fn draft_context(draft: &EventDraft) -> String {
    let mut parts = Vec::new();
    if let Some(title) = &draft.title {
        parts.push(format!("title: \"{title}\""));
    }
    if let Some(date) = draft.date {
        parts.push(format!("date: {}", date.format("%Y-%m-%d")));
    }
    if let Some(time) = draft.start_time {
        parts.push(format!("time: {}", time.format("%H:%M")));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("Pending event: {}.", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingParser {
        reply: PartialFields,
        seen_context: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ScheduleParser for RecordingParser {
        async fn parse(
            &self,
            _transcript: &str,
            _language: Language,
            _anchor: NaiveDateTime,
            context: &str,
        ) -> Result<PartialFields> {
            *self.seen_context.lock().unwrap() = Some(context.to_string());
            Ok(self.reply.clone())
        }
    }

    fn anchor() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-12-01 09:00", "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn context_is_empty_for_fresh_draft() {
        assert_eq!(draft_context(&EventDraft::new()), "");
    }

    #[test]
    fn context_lists_known_fields() {
        let draft = EventDraft {
            title: Some("meeting with John".into()),
            date: Some("2024-12-02".parse().unwrap()),
            start_time: None,
            duration_minutes: None,
        };
        assert_eq!(
            draft_context(&draft),
            "Pending event: title: \"meeting with John\", date: 2024-12-02."
        );
    }

    #[tokio::test]
    async fn passes_draft_context_to_parser() {
        let parser = Arc::new(RecordingParser {
            reply: PartialFields::default(),
            seen_context: Mutex::new(None),
        });
        let extractor = SlotExtractor::new(parser.clone(), Duration::from_secs(5));

        let draft = EventDraft {
            title: Some("lunch".into()),
            ..Default::default()
        };
        extractor
            .extract("tomorrow", &draft, Language::En, anchor(), ExtractionScope::All)
            .await
            .unwrap();

        let seen = parser.seen_context.lock().unwrap().clone().unwrap();
        assert!(seen.contains("title: \"lunch\""));
    }

    #[tokio::test]
    async fn time_only_scope_strips_titles() {
        let parser = Arc::new(RecordingParser {
            reply: PartialFields {
                title: Some("renamed".into()),
                start_time: Some("11:00".parse().unwrap()),
                ..Default::default()
            },
            seen_context: Mutex::new(None),
        });
        let extractor = SlotExtractor::new(parser, Duration::from_secs(5));

        let fields = extractor
            .extract(
                "11am",
                &EventDraft::new(),
                Language::En,
                anchor(),
                ExtractionScope::TimeOnly,
            )
            .await
            .unwrap();

        assert!(fields.title.is_none());
        assert_eq!(fields.start_time, Some("11:00".parse().unwrap()));
    }

    #[tokio::test]
    async fn time_only_scope_keeps_fields_of_a_new_request() {
        let parser = Arc::new(RecordingParser {
            reply: PartialFields {
                title: Some("dentist".into()),
                start_time: Some("09:00".parse().unwrap()),
                new_request: true,
                ..Default::default()
            },
            seen_context: Mutex::new(None),
        });
        let extractor = SlotExtractor::new(parser, Duration::from_secs(5));

        let fields = extractor
            .extract(
                "actually, book a dentist appointment at 9",
                &EventDraft::new(),
                Language::En,
                anchor(),
                ExtractionScope::TimeOnly,
            )
            .await
            .unwrap();

        assert_eq!(fields.title.as_deref(), Some("dentist"));
        assert_eq!(fields.start_time, Some("09:00".parse().unwrap()));
    }
}
