//! In-memory calendar capability, used by tests and the CLI demo.

use crate::calendar::CalendarCapability;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use vocal_core::{EventRequest, ExistingEvent, Result, VocalError};

/// A calendar backed by a plain in-memory event list.
///
/// Created events become existing events immediately, so a second booking
/// in the same process sees the first.
pub struct InMemoryCalendar {
    logged_in: AtomicBool,
    events: Mutex<Vec<ExistingEvent>>,
    created: Mutex<Vec<EventRequest>>,
}

impl InMemoryCalendar {
    /// Empty, logged-in calendar.
    pub fn new() -> Self {
        Self {
            logged_in: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Preloads existing events.
    pub fn with_events(self, events: Vec<ExistingEvent>) -> Self {
        *self.events.lock().unwrap() = events;
        self
    }

    /// Flips the simulated login state.
    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::SeqCst);
    }

    /// Events committed through `create_event`, in commit order.
    pub fn created_events(&self) -> Vec<EventRequest> {
        self.created.lock().unwrap().clone()
    }
}

impl Default for InMemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarCapability for InMemoryCalendar {
    async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.logged_in.load(Ordering::SeqCst))
    }

    async fn list_events(&self, date: NaiveDate) -> Result<Vec<ExistingEvent>> {
        if !self.logged_in.load(Ordering::SeqCst) {
            return Err(VocalError::NotLoggedIn);
        }
        let mut events: Vec<ExistingEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.start.date() == date)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start);
        Ok(events)
    }

    async fn create_event(&self, event: &EventRequest) -> Result<()> {
        if !self.logged_in.load(Ordering::SeqCst) {
            return Err(VocalError::NotLoggedIn);
        }
        self.events.lock().unwrap().push(ExistingEvent {
            title: event.title.clone(),
            start: event.start,
            end: event.end(),
        });
        self.created.lock().unwrap().push(event.clone());
        Ok(())
    }
}
