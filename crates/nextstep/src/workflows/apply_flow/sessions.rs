use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::ApplicationUser;
use super::engine::ApplicationFlowEngine;
use super::submission::SubmissionSink;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Builds the sink a new session submits through, bound to the session's applicant.
pub trait SinkProvider: Send + Sync {
    type Sink: SubmissionSink + 'static;

    fn sink_for(&self, applicant: &ApplicationUser) -> Arc<Self::Sink>;
}

/// A live flow together with the user that opened it and the job it applies to.
pub struct FlowSession<S> {
    pub owner: String,
    pub job_id: String,
    pub engine: Arc<ApplicationFlowEngine<S>>,
}

impl<S> Clone for FlowSession<S> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            job_id: self.job_id.clone(),
            engine: Arc::clone(&self.engine),
        }
    }
}

/// Open flows, one engine per session and at most one session per owner and job.
/// Nothing survives a restart.
pub struct FlowSessions<S> {
    sessions: Mutex<HashMap<SessionId, FlowSession<S>>>,
    sequence: AtomicU64,
}

impl<S> Default for FlowSessions<S> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(1),
        }
    }
}

impl<S> FlowSessions<S> {
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, FlowSession<S>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new flow. An earlier flow by the same owner for the same job is discarded.
    pub fn open(
        &self,
        owner: &str,
        job_id: &str,
        engine: ApplicationFlowEngine<S>,
    ) -> (SessionId, FlowSession<S>) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = SessionId(format!("flow-{sequence:06}"));
        let session = FlowSession {
            owner: owner.to_string(),
            job_id: job_id.to_string(),
            engine: Arc::new(engine),
        };

        let mut sessions = self.lock();
        sessions.retain(|existing, live| {
            let stale = live.owner == owner && live.job_id == job_id;
            if stale {
                debug!(session_id = %existing.0, job_id, "replacing earlier application flow");
            }
            !stale
        });
        sessions.insert(id.clone(), session.clone());
        (id, session)
    }

    pub fn get(&self, id: &SessionId) -> Option<FlowSession<S>> {
        self.lock().get(id).cloned()
    }

    pub fn close(&self, id: &SessionId) -> Option<FlowSession<S>> {
        self.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
