//! Vocal domain core.
//!
//! Pure domain types and logic for the dialogue-driven scheduling
//! pipeline: event drafts and slot accumulation, the conversation session
//! state machine model, conflict detection, localized messages,
//! configuration, and the shared error type. No I/O lives here.

pub mod config;
pub mod conflict;
pub mod draft;
pub mod error;
pub mod event;
pub mod intent;
pub mod language;
pub mod messages;
pub mod session;

pub use config::{CalendarConfig, ParserConfig, SchedulingPolicy, VocalConfig};
pub use conflict::{ConflictRecord, find_conflict};
pub use draft::{EventDraft, PartialFields, SlotField};
pub use error::{Result, VocalError};
pub use event::{EventRequest, ExistingEvent};
pub use language::Language;
pub use session::{ConversationSession, DialogueState, TurnMessage, TurnRole};
