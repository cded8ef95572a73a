//! End-to-end dialogue scenarios for the scheduling pipeline, driven
//! against a scripted parser and an in-memory calendar.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use vocal_application::{SchedulingService, SchedulingUseCase};
use vocal_core::{
    ConversationSession, DialogueState, EventRequest, ExistingEvent, Language, PartialFields,
    Result, SchedulingPolicy, VocalError, messages,
};
use vocal_interaction::{
    CalendarCapability, InMemoryCalendar, ScheduleParser, SharedCalendar, SlotExtractor,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn time(s: &str) -> NaiveTime {
    s.parse().unwrap()
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

/// Fixed turn anchor for every scenario: 2024-12-01 09:00.
fn anchor() -> NaiveDateTime {
    dt("2024-12-01 09:00")
}

/// Returns scripted parse results in order; panics if a scenario makes
/// more parse calls than its script allows.
struct ScriptedParser {
    replies: Mutex<VecDeque<Result<PartialFields>>>,
}

impl ScriptedParser {
    fn new(replies: Vec<Result<PartialFields>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl ScheduleParser for ScriptedParser {
    async fn parse(
        &self,
        _transcript: &str,
        _language: Language,
        _anchor: NaiveDateTime,
        _context: &str,
    ) -> Result<PartialFields> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("parser script exhausted")
    }
}

/// Calendar that fails the first N create calls, then delegates to an
/// in-memory calendar. Counts every create attempt.
struct FlakyCalendar {
    inner: InMemoryCalendar,
    remaining_failures: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FlakyCalendar {
    fn failing_creates(n: usize) -> Arc<Self> {
        Self::failing_creates_with_events(n, Vec::new())
    }

    fn failing_creates_with_events(n: usize, events: Vec<ExistingEvent>) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryCalendar::new().with_events(events),
            remaining_failures: AtomicUsize::new(n),
            create_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CalendarCapability for FlakyCalendar {
    async fn is_logged_in(&self) -> Result<bool> {
        self.inner.is_logged_in().await
    }

    async fn list_events(&self, day: NaiveDate) -> Result<Vec<ExistingEvent>> {
        self.inner.list_events(day).await
    }

    async fn create_event(&self, event: &EventRequest) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(VocalError::calendar_unavailable("automation hiccup"));
        }
        self.inner.create_event(event).await
    }
}

fn usecase(
    parser: Arc<dyn ScheduleParser>,
    calendar: Arc<dyn CalendarCapability>,
) -> SchedulingUseCase {
    // 60-minute default duration is the policy fixture for every scenario.
    SchedulingUseCase::new(
        SlotExtractor::new(parser, Duration::from_secs(5)),
        SharedCalendar::new(calendar, Duration::from_secs(5)),
        SchedulingPolicy::default(),
    )
}

fn title_only(title: &str) -> PartialFields {
    PartialFields {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn scenario_a_multi_turn_booking_commits_with_default_duration() {
    let parser = ScriptedParser::new(vec![
        Ok(title_only("meeting with John")),
        Ok(PartialFields {
            date: Some(date("2024-12-02")),
            start_time: Some(time("15:00")),
            ..Default::default()
        }),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new());
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-a", Language::En);
    let (session, reply) = usecase
        .advance_session(session, "meeting with John", anchor())
        .await;
    assert!(!reply.done);
    assert_eq!(session.state, DialogueState::SlotFilling);

    let (session, reply) = usecase
        .advance_session(session, "tomorrow at 3pm", anchor())
        .await;
    assert!(reply.done);
    assert!(session.is_done());

    assert_eq!(
        calendar.created_events(),
        vec![EventRequest {
            title: "meeting with John".to_string(),
            start: dt("2024-12-02 15:00"),
            duration_minutes: 60,
        }]
    );
}

#[tokio::test]
async fn scenario_b_conflict_renegotiation_then_commit() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("planning sync".into()),
            date: Some(date("2024-12-02")),
            start_time: Some(time("10:00")),
            ..Default::default()
        }),
        // The renegotiation turn tries to smuggle in a new title; the
        // time-only scope must drop it.
        Ok(PartialFields {
            title: Some("renamed meeting".into()),
            start_time: Some(time("11:00")),
            ..Default::default()
        }),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new().with_events(vec![ExistingEvent {
        title: "Team Standup".into(),
        start: dt("2024-12-02 10:00"),
        end: dt("2024-12-02 10:30"),
    }]));
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-b", Language::En);
    let (session, reply) = usecase
        .advance_session(session, "planning sync tomorrow at 10", anchor())
        .await;
    assert!(!reply.done);
    assert!(reply.message.contains("Team Standup"));
    assert_eq!(session.state, DialogueState::ConflictResolution);
    assert!(session.conflict.is_some());

    let (session, reply) = usecase.advance_session(session, "11am", anchor()).await;
    assert!(reply.done);
    assert!(session.is_done());

    let created = calendar.created_events();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "planning sync");
    assert_eq!(created[0].start, dt("2024-12-02 11:00"));
}

#[tokio::test]
async fn scenario_c_unrecognized_turn_reasks_unchanged() {
    let parser = ScriptedParser::new(vec![
        Ok(title_only("meeting with John")),
        Ok(PartialFields::default()),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new());
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-c", Language::En);
    let (session, first) = usecase
        .advance_session(session, "meeting with John", anchor())
        .await;
    let draft_before = session.draft.clone();

    let (session, second) = usecase
        .advance_session(session, "the weather is nice today", anchor())
        .await;

    assert_eq!(second.message, first.message);
    assert_eq!(session.draft, draft_before);
    assert_eq!(session.state, DialogueState::SlotFilling);
    assert!(calendar.created_events().is_empty());
}

#[tokio::test]
async fn parse_unavailable_never_mutates_draft_or_state() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("review".into()),
            date: Some(date("2024-12-02")),
            ..Default::default()
        }),
        Err(VocalError::parse_unavailable("service down")),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new());
    let usecase = usecase(parser, calendar);

    let session = ConversationSession::new("s-p", Language::En);
    let (session, _) = usecase
        .advance_session(session, "review tomorrow", anchor())
        .await;
    let draft_before = session.draft.clone();
    let state_before = session.state;

    let (session, reply) = usecase.advance_session(session, "at 3pm", anchor()).await;

    assert_eq!(reply.message, messages::parse_retry(Language::En));
    assert!(!reply.done);
    assert_eq!(session.draft, draft_before);
    assert_eq!(session.state, state_before);
}

#[tokio::test]
async fn failed_commit_keeps_draft_and_retries_without_reasking() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("review".into()),
            date: Some(date("2024-12-02")),
            start_time: Some(time("14:00")),
            ..Default::default()
        }),
        // "try again" carries no new fields.
        Ok(PartialFields::default()),
    ]);
    let calendar = FlakyCalendar::failing_creates(1);
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-f", Language::En);
    let (session, reply) = usecase
        .advance_session(session, "review tomorrow at 2pm", anchor())
        .await;
    assert_eq!(reply.message, messages::calendar_retry(Language::En));
    assert!(!reply.done);
    assert_eq!(session.state, DialogueState::ConflictResolution);
    assert!(session.draft.is_complete());
    // Commit attempted exactly once on the failing turn.
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 1);

    let (session, reply) = usecase
        .advance_session(session, "try again", anchor())
        .await;
    assert!(reply.done);
    assert!(session.is_done());
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 2);
    assert_eq!(calendar.inner.created_events().len(), 1);
}

#[tokio::test]
async fn not_logged_in_pauses_at_conflict_resolution_entry() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("dentist".into()),
            date: Some(date("2024-12-03")),
            start_time: Some(time("09:00")),
            ..Default::default()
        }),
        Ok(PartialFields::default()),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new());
    calendar.set_logged_in(false);
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-l", Language::En);
    let (session, reply) = usecase
        .advance_session(session, "dentist on the 3rd at 9am", anchor())
        .await;
    assert_eq!(reply.message, messages::login_required(Language::En));
    assert!(!reply.done);
    assert_eq!(session.state, DialogueState::ConflictResolution);
    assert!(session.draft.is_complete());

    // Out-of-band login completion, then a bare retry turn commits.
    calendar.set_logged_in(true);
    let (session, reply) = usecase.advance_session(session, "okay done", anchor()).await;
    assert!(reply.done);
    assert!(session.is_done());
    assert_eq!(calendar.created_events().len(), 1);
}

#[tokio::test]
async fn cancel_discards_draft_and_finishes_the_dialogue() {
    let parser = ScriptedParser::new(vec![Ok(title_only("meeting with John"))]);
    let calendar = Arc::new(InMemoryCalendar::new());
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-x", Language::En);
    let (session, _) = usecase
        .advance_session(session, "meeting with John", anchor())
        .await;

    let (session, reply) = usecase
        .advance_session(session, "actually, cancel that", anchor())
        .await;
    assert!(reply.done);
    assert_eq!(reply.message, messages::cancelled(Language::En));
    assert!(session.is_done());
    assert!(calendar.created_events().is_empty());

    // A finished dialogue accepts no further bookings.
    let (_, reply) = usecase
        .advance_session(session, "meeting tomorrow", anchor())
        .await;
    assert!(reply.done);
    assert_eq!(reply.message, messages::session_finished(Language::En));
}

#[tokio::test]
async fn unrelated_new_request_replaces_the_draft() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("meeting with John".into()),
            date: Some(date("2024-12-02")),
            ..Default::default()
        }),
        Ok(PartialFields {
            title: Some("dentist".into()),
            start_time: Some(time("09:00")),
            new_request: true,
            ..Default::default()
        }),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new());
    let usecase = usecase(parser, calendar);

    let session = ConversationSession::new("s-n", Language::En);
    let (session, _) = usecase
        .advance_session(session, "meeting with John tomorrow", anchor())
        .await;

    let (session, reply) = usecase
        .advance_session(session, "actually, add a dentist appointment at 9am", anchor())
        .await;

    // The old date must not leak into the new booking.
    assert_eq!(session.draft.title.as_deref(), Some("dentist"));
    assert_eq!(session.draft.date, None);
    assert!(!reply.done);
    assert_eq!(session.state, DialogueState::SlotFilling);
}

#[tokio::test]
async fn new_request_during_conflict_keeps_its_title() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("planning sync".into()),
            date: Some(date("2024-12-02")),
            start_time: Some(time("10:00")),
            ..Default::default()
        }),
        // Mid-renegotiation the user abandons the conflicted booking for
        // an unrelated one; its full fields must survive the time-only
        // renegotiation scope.
        Ok(PartialFields {
            title: Some("dentist".into()),
            start_time: Some(time("09:00")),
            new_request: true,
            ..Default::default()
        }),
    ]);
    let calendar = Arc::new(InMemoryCalendar::new().with_events(vec![ExistingEvent {
        title: "Team Standup".into(),
        start: dt("2024-12-02 10:00"),
        end: dt("2024-12-02 10:30"),
    }]));
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-nc", Language::En);
    let (session, _) = usecase
        .advance_session(session, "planning sync tomorrow at 10", anchor())
        .await;
    assert_eq!(session.state, DialogueState::ConflictResolution);

    let (session, reply) = usecase
        .advance_session(session, "forget that, dentist appointment at 9am", anchor())
        .await;

    assert_eq!(session.draft.title.as_deref(), Some("dentist"));
    assert_eq!(session.draft.start_time, Some(time("09:00")));
    // Nothing of the conflicted booking survives.
    assert_eq!(session.draft.date, None);
    assert!(session.conflict.is_none());
    assert!(!reply.done);
    assert_eq!(session.state, DialogueState::SlotFilling);
    assert!(calendar.created_events().is_empty());
}

#[tokio::test]
async fn transient_failure_after_renegotiation_clears_the_conflict() {
    let parser = ScriptedParser::new(vec![
        Ok(PartialFields {
            title: Some("planning sync".into()),
            date: Some(date("2024-12-02")),
            start_time: Some(time("10:00")),
            ..Default::default()
        }),
        Ok(PartialFields {
            start_time: Some(time("11:00")),
            ..Default::default()
        }),
        Ok(PartialFields::default()),
    ]);
    let calendar = FlakyCalendar::failing_creates_with_events(
        1,
        vec![ExistingEvent {
            title: "Team Standup".into(),
            start: dt("2024-12-02 10:00"),
            end: dt("2024-12-02 10:30"),
        }],
    );
    let usecase = usecase(parser, calendar.clone());

    let session = ConversationSession::new("s-rc", Language::En);
    let (session, _) = usecase
        .advance_session(session, "planning sync tomorrow at 10", anchor())
        .await;
    assert!(session.conflict.is_some());

    // The 11:00 slot is free but the commit fails transiently; the
    // resolved conflict must not linger on the session.
    let (session, reply) = usecase.advance_session(session, "11am", anchor()).await;
    assert_eq!(reply.message, messages::calendar_retry(Language::En));
    assert!(session.conflict.is_none());
    assert_eq!(session.state, DialogueState::ConflictResolution);

    let (session, reply) = usecase
        .advance_session(session, "try again", anchor())
        .await;
    assert!(reply.done);
    assert!(session.is_done());
    assert_eq!(calendar.inner.created_events()[0].start, dt("2024-12-02 11:00"));
}

#[tokio::test]
async fn slot_accumulation_is_order_independent() {
    let field_sets = |order: [usize; 3]| -> Vec<Result<PartialFields>> {
        let all = [
            Ok(title_only("retro")),
            Ok(PartialFields {
                date: Some(date("2024-12-05")),
                ..Default::default()
            }),
            Ok(PartialFields {
                start_time: Some(time("16:00")),
                ..Default::default()
            }),
        ];
        order.into_iter().map(|i| all[i].clone()).collect()
    };

    let mut committed = Vec::new();
    for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0]] {
        let parser = ScriptedParser::new(field_sets(order));
        let calendar = Arc::new(InMemoryCalendar::new());
        let usecase = usecase(parser, calendar.clone());

        let mut session = ConversationSession::new("s-o", Language::En);
        for turn in ["one", "two", "three"] {
            let (next, _) = usecase.advance_session(session, turn, anchor()).await;
            session = next;
        }
        assert!(session.is_done());
        committed.push(calendar.created_events());
    }

    assert_eq!(committed[0], committed[1]);
    assert_eq!(committed[1], committed[2]);
    assert_eq!(committed[0][0].start, dt("2024-12-05 16:00"));
}

#[tokio::test]
async fn traditional_chinese_sessions_get_simplified_replies() {
    let parser = ScriptedParser::new(vec![Err(VocalError::parse_unavailable("down"))]);
    let calendar = Arc::new(InMemoryCalendar::new());
    let usecase = usecase(parser, calendar);

    let session = ConversationSession::new("s-zh", Language::ZhHant);
    let (_, reply) = usecase.advance_session(session, "開會", anchor()).await;
    assert_eq!(reply.message, messages::parse_retry(Language::ZhHans));
}

// ===== Service boundary =====

/// Parser whose first call blocks until released; later calls return
/// nothing extracted.
struct BlockingParser {
    started: Arc<Notify>,
    release: Arc<Notify>,
    first_call: AtomicBool,
}

#[async_trait]
impl ScheduleParser for BlockingParser {
    async fn parse(
        &self,
        _transcript: &str,
        _language: Language,
        _anchor: NaiveDateTime,
        _context: &str,
    ) -> Result<PartialFields> {
        if self.first_call.swap(false, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(PartialFields::default())
    }
}

fn service_with(parser: Arc<dyn ScheduleParser>) -> Arc<SchedulingService> {
    let calendar: Arc<dyn CalendarCapability> = Arc::new(InMemoryCalendar::new());
    Arc::new(SchedulingService::new(Arc::new(usecase(parser, calendar))))
}

#[tokio::test]
async fn service_round_trip_with_history() {
    let parser = ScriptedParser::new(vec![Ok(title_only("lunch"))]);
    let service = service_with(parser);

    let (id, greeting) = service.start_session(Language::En).await;
    assert_eq!(greeting, messages::greeting(Language::En));

    let outcome = service.advance(&id, "lunch").await.unwrap();
    assert!(!outcome.done);

    // Greeting + user turn + assistant reply.
    let history = service.history(&id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].content, "lunch");
    assert_eq!(history[2].content, outcome.message);
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let parser = ScriptedParser::new(vec![]);
    let service = service_with(parser);

    let err = service.advance("no-such-id", "hello").await.unwrap_err();
    assert!(matches!(err, VocalError::SessionNotFound { .. }));
    assert!(service.history("no-such-id").await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_in_flight_turn_for_a_session_is_rejected() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let parser = Arc::new(BlockingParser {
        started: started.clone(),
        release: release.clone(),
        first_call: AtomicBool::new(true),
    });
    let service = service_with(parser);

    let (id, _) = service.start_session(Language::En).await;

    let background = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.advance(&id, "first").await })
    };

    started.notified().await;
    let err = service.advance(&id, "second").await.unwrap_err();
    assert!(matches!(err, VocalError::SessionBusy { .. }));

    release.notify_one();
    background.await.unwrap().unwrap();

    // Once the turn completes, the session accepts input again.
    assert!(service.advance(&id, "third").await.is_ok());
}
