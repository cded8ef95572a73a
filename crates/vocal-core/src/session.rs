//! Conversation session domain model.
//!
//! A [`ConversationSession`] holds the per-user dialogue state across
//! turns: the current draft, the state-machine position, any surfaced
//! conflict, and the display-only turn history. Transitions produce an
//! updated value via the `with_*` methods rather than mutating shared
//! state field by field, so each transition is auditable and concurrent
//! sessions stay isolated.

use crate::conflict::ConflictRecord;
use crate::draft::EventDraft;
use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Position of a session in the scheduling state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// No booking in progress; the next transcript starts one.
    AwaitingRequest,
    /// A draft exists but is missing fields; prompting for them.
    SlotFilling,
    /// The draft is complete; reconciling it against the calendar.
    ConflictResolution,
    /// Terminal: committed or cancelled. A fresh session is required for
    /// further bookings.
    Done,
}

/// Role of a turn-history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRole {
    /// The user's transcript.
    User,
    /// The assistant's reply.
    Assistant,
}

/// One entry of the display-only turn history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMessage {
    /// Who produced this message.
    pub role: TurnRole,
    /// Message content.
    pub content: String,
    /// Timestamp when the message was recorded (ISO 8601 format).
    pub timestamp: String,
}

/// Per-user dialogue state for one scheduling conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Opaque session identifier (one per active dialogue).
    pub id: String,
    /// Language selected at session start.
    pub language: Language,
    /// Current state-machine position.
    pub state: DialogueState,
    /// The in-progress event draft.
    pub draft: EventDraft,
    /// The surfaced conflict, set only while in ConflictResolution.
    pub conflict: Option<ConflictRecord>,
    /// Append-only history of (role, message) pairs, for transcript
    /// display, never for reasoning.
    pub turn_history: Vec<TurnMessage>,
    /// Timestamp when the session was created (ISO 8601 format).
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format).
    pub updated_at: String,
}

impl ConversationSession {
    /// Creates a fresh session in `AwaitingRequest` with an empty draft.
    pub fn new(id: impl Into<String>, language: Language) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            language,
            state: DialogueState::AwaitingRequest,
            draft: EventDraft::new(),
            conflict: None,
            turn_history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Returns true once the session reached its terminal state.
    pub fn is_done(&self) -> bool {
        self.state == DialogueState::Done
    }

    /// Transitions to `state`, stamping `updated_at`.
    #[must_use]
    pub fn with_state(mut self, state: DialogueState) -> Self {
        self.state = state;
        self.touch()
    }

    /// Replaces the draft.
    #[must_use]
    pub fn with_draft(mut self, draft: EventDraft) -> Self {
        self.draft = draft;
        self.touch()
    }

    /// Sets or clears the surfaced conflict.
    #[must_use]
    pub fn with_conflict(mut self, conflict: Option<ConflictRecord>) -> Self {
        self.conflict = conflict;
        self.touch()
    }

    /// Discards the current booking attempt: empty draft, no conflict,
    /// back to `AwaitingRequest`. Turn history is kept.
    #[must_use]
    pub fn with_fresh_draft(self) -> Self {
        self.with_draft(EventDraft::new())
            .with_conflict(None)
            .with_state(DialogueState::AwaitingRequest)
    }

    /// Appends a message to the turn history.
    #[must_use]
    pub fn with_turn(mut self, role: TurnRole, content: impl Into<String>) -> Self {
        self.turn_history.push(TurnMessage {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        self.touch()
    }

    fn touch(mut self) -> Self {
        self.updated_at = chrono::Utc::now().to_rfc3339();
        self
    }
}
