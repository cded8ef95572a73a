//! The external calendar capability seam.
//!
//! The real capability drives a single stateful browser/login session, so
//! it is exposed through [`SharedCalendar`], an explicitly owned,
//! mutex-guarded handle that serializes every call across all dialogue
//! sessions and bounds each wait.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use vocal_core::{EventRequest, ExistingEvent, Result, VocalError};

/// Operations the core needs from the calendar automation collaborator.
///
/// The core only reads login state and issues read/create calls; login
/// mechanics belong to the collaborator.
#[async_trait]
pub trait CalendarCapability: Send + Sync {
    /// Whether the underlying automation session has an active login.
    async fn is_logged_in(&self) -> Result<bool>;

    /// Lists events on the given calendar day, ordered by start.
    async fn list_events(&self, date: NaiveDate) -> Result<Vec<ExistingEvent>>;

    /// Creates the event. `Err(NotLoggedIn)` when the login lapsed,
    /// `Err(CalendarUnavailable)` on transient automation failure.
    async fn create_event(&self, event: &EventRequest) -> Result<()>;
}

#[async_trait]
impl<T: CalendarCapability + ?Sized> CalendarCapability for Arc<T> {
    async fn is_logged_in(&self) -> Result<bool> {
        (**self).is_logged_in().await
    }

    async fn list_events(&self, date: NaiveDate) -> Result<Vec<ExistingEvent>> {
        (**self).list_events(date).await
    }

    async fn create_event(&self, event: &EventRequest) -> Result<()> {
        (**self).create_event(event).await
    }
}

/// Shared, serialized access to the one calendar capability instance.
///
/// Never duplicated per session: all sessions share this handle, and the
/// inner mutex guarantees the stateful automation session sees one call
/// at a time. Every call is bounded; a timeout is reported as
/// `CalendarUnavailable`, identical to any other transient failure.
#[derive(Clone)]
pub struct SharedCalendar {
    inner: Arc<Mutex<Box<dyn CalendarCapability>>>,
    timeout: Duration,
}

impl SharedCalendar {
    /// Wraps a capability instance with serialization and timeouts.
    pub fn new(capability: impl CalendarCapability + 'static, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(capability))),
            timeout,
        }
    }

    /// Checks login state with a bounded wait.
    pub async fn is_logged_in(&self) -> Result<bool> {
        let guard = self.inner.lock().await;
        tokio::time::timeout(self.timeout, guard.is_logged_in())
            .await
            .map_err(|_| VocalError::calendar_unavailable("login check timed out"))?
    }

    /// Lists events for a day with a bounded wait.
    pub async fn list_events(&self, date: NaiveDate) -> Result<Vec<ExistingEvent>> {
        let guard = self.inner.lock().await;
        tokio::time::timeout(self.timeout, guard.list_events(date))
            .await
            .map_err(|_| VocalError::calendar_unavailable("event listing timed out"))?
    }

    /// Creates an event with a bounded wait.
    pub async fn create_event(&self, event: &EventRequest) -> Result<()> {
        let guard = self.inner.lock().await;
        tokio::time::timeout(self.timeout, guard.create_event(event))
            .await
            .map_err(|_| VocalError::calendar_unavailable("event creation timed out"))?
    }
}
