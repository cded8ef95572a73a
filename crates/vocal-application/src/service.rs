//! Session registry and the upward dialogue boundary.
//!
//! `SchedulingService` owns the map of live sessions and enforces the
//! concurrency contract: any number of distinct sessions may advance
//! concurrently, but at most one turn per session is in flight at a time.

use crate::scheduling_usecase::{AdvanceOutcome, SchedulingUseCase};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::RwLock;
use uuid::Uuid;
use vocal_core::{ConversationSession, Language, Result, TurnMessage, TurnRole, VocalError, messages};

/// Upward-facing boundary of the scheduling pipeline.
pub struct SchedulingService {
    usecase: Arc<SchedulingUseCase>,
    /// Live sessions keyed by session id.
    sessions: RwLock<HashMap<String, ConversationSession>>,
    /// Sessions with a turn currently in flight.
    in_flight: Arc<StdMutex<HashSet<String>>>,
}

impl SchedulingService {
    /// Creates a service over the orchestration use case.
    pub fn new(usecase: Arc<SchedulingUseCase>) -> Self {
        Self {
            usecase,
            sessions: RwLock::new(HashMap::new()),
            in_flight: Arc::new(StdMutex::new(HashSet::new())),
        }
    }

    /// Starts a fresh dialogue and returns its id plus the greeting.
    pub async fn start_session(&self, language: Language) -> (String, String) {
        let id = Uuid::new_v4().to_string();
        let greeting = messages::greeting(language);
        let session =
            ConversationSession::new(id.clone(), language).with_turn(TurnRole::Assistant, &greeting);

        self.sessions.write().await.insert(id.clone(), session);
        tracing::info!(session = %id, language = language.tag(), "session started");
        (id, greeting)
    }

    /// Advances a session by one turn.
    ///
    /// The anchor for relative-date resolution is taken at call time.
    /// A second call for the same session while one is in flight is
    /// rejected with `SessionBusy`; the session's state mutations are
    /// not designed to be interleaved.
    pub async fn advance(&self, session_id: &str, transcript: &str) -> Result<AdvanceOutcome> {
        let _turn = TurnGuard::begin(&self.in_flight, session_id)?;

        let session = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| VocalError::session_not_found(session_id))?;

        let anchor = chrono::Local::now().naive_local();
        let (updated, reply) = self
            .usecase
            .advance_session(session, transcript, anchor)
            .await;

        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), updated);

        Ok(reply.into())
    }

    /// Read-only turn history for display.
    pub async fn history(&self, session_id: &str) -> Result<Vec<TurnMessage>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|session| session.turn_history.clone())
            .ok_or_else(|| VocalError::session_not_found(session_id))
    }

    /// Drops a session from the registry.
    pub async fn remove_session(&self, session_id: &str) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| VocalError::session_not_found(session_id))
    }
}

/// Marks a session's turn as in flight for the guard's lifetime.
struct TurnGuard {
    in_flight: Arc<StdMutex<HashSet<String>>>,
    session_id: String,
}

impl TurnGuard {
    fn begin(in_flight: &Arc<StdMutex<HashSet<String>>>, session_id: &str) -> Result<Self> {
        let mut guard = in_flight.lock().map_err(|_| {
            VocalError::internal("in-flight turn set poisoned")
        })?;
        if !guard.insert(session_id.to_string()) {
            return Err(VocalError::session_busy(session_id));
        }
        Ok(Self {
            in_flight: Arc::clone(in_flight),
            session_id: session_id.to_string(),
        })
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.in_flight.lock() {
            guard.remove(&self.session_id);
        }
    }
}
