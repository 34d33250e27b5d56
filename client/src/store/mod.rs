//! Client-side state stores
//!
//! Each store owns one resource type (the session, the notes collection)
//! plus a [`RequestStatus`] describing its most recent asynchronous action.
//!
//! An action moves through three phases:
//!
//! 1. requested: the store gets a fresh [`RequestId`] and goes `Loading`
//! 2. resolved: server data is applied and the status becomes `Succeeded`
//! 3. rejected: the error's [`user_message`](crate::error::AppError::user_message)
//!    is recorded as `Failed`
//!
//! Data from a settled action is always applied. The status is only written
//! by the most recently dispatched action, so a slow response can't replace a
//! newer one's status. The session store goes further and discards a
//! superseded login/register outcome, since its user and status must agree.
//!
//! State lives in a `tokio::sync::watch` channel: views call `subscribe()` and
//! re-render whenever a snapshot changes.

pub mod notes;
pub mod session;

pub use notes::{NotesState, NotesStore};
pub use session::{SessionState, SessionStore};

use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Outcome of a store's most recent action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed {
        message: String,
    },
}

impl RequestStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestStatus::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestStatus::Succeeded)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RequestStatus::Failed { .. })
    }

    /// Error text; only set when `Failed`
    pub fn message(&self) -> Option<&str> {
        match self {
            RequestStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Identifies one dispatched action within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Store state that carries a request status
pub(crate) trait Tracked {
    fn status_mut(&mut self) -> &mut RequestStatus;
}

/// Shared state cell used by both stores
pub(crate) struct StoreCell<S> {
    state: watch::Sender<S>,
    next_id: AtomicU64,
    latest_id: AtomicU64,
}

impl<S> StoreCell<S>
where
    S: Tracked + Clone,
{
    pub(crate) fn new(initial: S) -> Self {
        Self {
            state: watch::Sender::new(initial),
            next_id: AtomicU64::new(0),
            latest_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        (*self.state.borrow()).clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    /// Read a value out of the current state without cloning all of it
    pub(crate) fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&*self.state.borrow())
    }

    /// Apply a synchronous change and notify subscribers
    pub(crate) fn modify(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
    }

    /// Requested phase: allocate an id and go `Loading`
    pub(crate) fn begin(&self, action: &'static str) -> RequestId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest_id.fetch_max(id, Ordering::SeqCst);

        self.modify(|state| *state.status_mut() = RequestStatus::Loading);

        let id = RequestId(id);
        tracing::info!("{} {} requested", action, id);
        id
    }

    /// Whether `id` is the most recently dispatched action
    pub(crate) fn is_latest(&self, id: RequestId) -> bool {
        self.latest_id.load(Ordering::SeqCst) == id.0
    }

    /// Resolved phase: apply `update`, then mark `Succeeded` if still current
    pub(crate) fn fulfill(&self, action: &'static str, id: RequestId, update: impl FnOnce(&mut S)) {
        self.modify(|state| {
            update(state);
            if self.is_latest(id) {
                *state.status_mut() = RequestStatus::Succeeded;
            } else {
                tracing::debug!("{} {} resolved after a newer request; status kept", action, id);
            }
        });
        tracing::info!("{} {} resolved", action, id);
    }

    /// Rejected phase: apply `update`, then record the failure if still current
    pub(crate) fn reject(
        &self,
        action: &'static str,
        id: RequestId,
        error: &AppError,
        update: impl FnOnce(&mut S),
    ) {
        let message = error.user_message();
        tracing::warn!("{} {} rejected: {}", action, id, error);

        self.modify(|state| {
            update(state);
            if self.is_latest(id) {
                *state.status_mut() = RequestStatus::Failed { message };
            } else {
                tracing::debug!("{} {} rejected after a newer request; status kept", action, id);
            }
        });
    }

    /// Back to `Idle`; data is untouched
    pub(crate) fn reset_status(&self) {
        self.modify(|state| *state.status_mut() = RequestStatus::Idle);
    }
}
