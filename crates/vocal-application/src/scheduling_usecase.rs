//! Scheduling orchestration use case.
//!
//! `SchedulingUseCase` drives one dialogue turn through the scheduling
//! state machine: extract fields into the draft, prompt for what is still
//! missing, reconcile a complete draft against the calendar, and commit.
//! Every turn produces exactly one user-facing reply; all capability
//! failures are recovered here into prompts, never propagated raw.

use chrono::NaiveDateTime;
use vocal_core::{
    ConversationSession, DialogueState, EventRequest, SchedulingPolicy, TurnRole, VocalError,
    find_conflict, intent, messages,
};
use vocal_interaction::{ExtractionScope, SharedCalendar, SlotExtractor};

/// The single reply emitted for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// User-facing message.
    pub message: String,
    /// True once the dialogue reached its terminal state.
    pub done: bool,
}

/// Top-level driver of the dialogue scheduling pipeline.
pub struct SchedulingUseCase {
    extractor: SlotExtractor,
    calendar: SharedCalendar,
    policy: SchedulingPolicy,
}

impl SchedulingUseCase {
    /// Creates a use case over the two external capabilities.
    pub fn new(
        extractor: SlotExtractor,
        calendar: SharedCalendar,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            extractor,
            calendar,
            policy,
        }
    }

    /// Advances one session by one turn.
    ///
    /// Takes the session by value and returns the replaced instance, so
    /// each transition is a whole-value update. The anchor must be the
    /// moment of this turn; relative dates resolve against it.
    pub async fn advance_session(
        &self,
        session: ConversationSession,
        transcript: &str,
        anchor: NaiveDateTime,
    ) -> (ConversationSession, TurnReply) {
        let language = session.language;
        let session = session.with_turn(TurnRole::User, transcript);

        // Terminal sessions accept no further bookings; the invalid turn
        // is recovered into a prompt like the rest of the turn taxonomy.
        if session.is_done() {
            let err = VocalError::invalid_turn("turn on a finished session");
            tracing::debug!(session = %session.id, error = %err, "turn rejected");
            return Self::reply(session, messages::session_finished(language), true);
        }

        // Cancel is detected locally so it works with the parser down.
        if intent::is_cancel(transcript) {
            tracing::info!(session = %session.id, "booking cancelled by user");
            let session = session
                .with_conflict(None)
                .with_state(DialogueState::Done);
            return Self::reply(session, messages::cancelled(language), true);
        }

        let scope = if session.state == DialogueState::ConflictResolution {
            ExtractionScope::TimeOnly
        } else {
            ExtractionScope::All
        };

        let fields = match self
            .extractor
            .extract(transcript, &session.draft, language, anchor, scope)
            .await
        {
            Ok(fields) => fields,
            Err(err) => {
                // Draft and state stay untouched; the user just retries.
                tracing::warn!(session = %session.id, error = %err, "parse unavailable");
                return Self::reply(session, messages::parse_retry(language), false);
            }
        };

        let session = if fields.new_request {
            tracing::info!(session = %session.id, "unrelated request; starting a fresh draft");
            session.with_fresh_draft()
        } else {
            session
        };

        // No-op turn: nothing recognized and the draft is still
        // incomplete. Re-ask the outstanding question unchanged.
        if fields.is_empty() && !session.draft.is_complete() {
            let missing = session.draft.missing();
            return Self::reply(session, messages::ask_missing(&missing, language), false);
        }

        let session = {
            let draft = session.draft.merge(&fields);
            session.with_draft(draft)
        };

        let missing = session.draft.missing();
        if !missing.is_empty() {
            let slots: Vec<String> = missing.iter().map(ToString::to_string).collect();
            tracing::debug!(session = %session.id, missing = %slots.join(","), "prompting for slots");
            let session = session.with_state(DialogueState::SlotFilling);
            return Self::reply(session, messages::ask_missing(&missing, language), false);
        }

        self.try_schedule(session).await
    }

    /// Reconciles a complete draft against the calendar and commits it.
    ///
    /// Entry point of the CONFLICT_RESOLUTION phase; also re-entered by
    /// empty follow-up turns ("try again") after a transient failure, so
    /// the user never restates known fields. The commit call has a single
    /// call site, so it runs at most once per turn.
    async fn try_schedule(
        &self,
        session: ConversationSession,
    ) -> (ConversationSession, TurnReply) {
        let language = session.language;
        let session = session.with_state(DialogueState::ConflictResolution);

        let Some(request) = session
            .draft
            .finalize(self.policy.default_duration_minutes)
        else {
            // Unreachable for a complete draft; recover into a re-ask.
            tracing::error!(session = %session.id, "finalize failed on a complete draft");
            let missing = session.draft.missing();
            let session = session.with_state(DialogueState::SlotFilling);
            return Self::reply(session, messages::ask_missing(&missing, language), false);
        };

        match self.calendar.is_logged_in().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(session = %session.id, "calendar not logged in");
                return Self::reply(session, messages::login_required(language), false);
            }
            Err(err) => {
                tracing::warn!(session = %session.id, error = %err, "login check failed");
                return Self::reply(session, messages::calendar_retry(language), false);
            }
        }

        let existing = match self.calendar.list_events(request.start.date()).await {
            Ok(events) => events,
            Err(VocalError::NotLoggedIn) => {
                return Self::reply(session, messages::login_required(language), false);
            }
            Err(err) => {
                tracing::warn!(session = %session.id, error = %err, "event listing failed");
                return Self::reply(session, messages::calendar_retry(language), false);
            }
        };

        if let Some(conflict) = find_conflict(&request, &existing) {
            tracing::info!(
                session = %session.id,
                conflicting_title = %conflict.conflicting_title,
                "conflict detected; renegotiating"
            );
            let message = messages::conflict_prompt(&conflict, language);
            let session = session.with_conflict(Some(conflict));
            return Self::reply(session, message, false);
        }

        // The slot is free; any conflict from a previous turn is resolved
        // even if the commit below fails transiently.
        let session = session.with_conflict(None);
        self.commit(session, request).await
    }

    async fn commit(
        &self,
        session: ConversationSession,
        request: EventRequest,
    ) -> (ConversationSession, TurnReply) {
        let language = session.language;
        match self.calendar.create_event(&request).await {
            Ok(()) => {
                tracing::info!(
                    session = %session.id,
                    start = %request.start,
                    "event committed"
                );
                let session = session.with_state(DialogueState::Done);
                Self::reply(session, messages::confirmation(&request, language), true)
            }
            Err(VocalError::NotLoggedIn) => {
                // Draft stays intact; the user completes login and retries.
                tracing::warn!(session = %session.id, "commit rejected: not logged in");
                Self::reply(session, messages::login_required(language), false)
            }
            Err(err) => {
                tracing::warn!(session = %session.id, error = %err, "commit failed");
                Self::reply(session, messages::calendar_retry(language), false)
            }
        }
    }

    fn reply(
        session: ConversationSession,
        message: String,
        done: bool,
    ) -> (ConversationSession, TurnReply) {
        let session = session.with_turn(TurnRole::Assistant, message.clone());
        (session, TurnReply { message, done })
    }
}

/// Dialogue boundary outcome exposed upward by the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// The reply message for this turn.
    pub message: String,
    /// True once the dialogue reached its terminal state.
    pub done: bool,
}

impl From<TurnReply> for AdvanceOutcome {
    fn from(reply: TurnReply) -> Self {
        Self {
            message: reply.message,
            done: reply.done,
        }
    }
}
