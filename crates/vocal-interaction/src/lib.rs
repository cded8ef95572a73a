//! External capability seams for the Vocal pipeline.
//!
//! This crate owns the boundaries to the two external collaborators: the
//! natural-language parsing capability ([`ScheduleParser`], with an
//! OpenAI-backed implementation) and the calendar automation capability
//! ([`CalendarCapability`], accessed through the serialized
//! [`SharedCalendar`] handle). [`SlotExtractor`] sits on top of the
//! parser, adding draft context, anchoring, scoping, and timeouts.

pub mod calendar;
pub mod extractor;
pub mod memory_calendar;
pub mod openai_parser;
pub mod parser;

pub use calendar::{CalendarCapability, SharedCalendar};
pub use extractor::{ExtractionScope, SlotExtractor};
pub use memory_calendar::InMemoryCalendar;
pub use openai_parser::OpenAiScheduleParser;
pub use parser::ScheduleParser;
