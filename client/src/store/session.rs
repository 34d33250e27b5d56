//! Session store
//!
//! Holds the authenticated user and mirrors it to local storage under
//! [`SESSION_STORAGE_KEY`] so the session survives restarts.

use super::{RequestId, RequestStatus, StoreCell, Tracked};
use crate::api::NotesApi;
use crate::config::SESSION_STORAGE_KEY;
use crate::error::Result;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::storage::LocalStorage;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub user: Option<User>,
    pub status: RequestStatus,
}

impl Tracked for SessionState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

struct SessionInner {
    api: Arc<dyn NotesApi>,
    storage: LocalStorage,
    cell: StoreCell<SessionState>,
    /// Held while storage and the in-memory user are updated together
    commit: Mutex<()>,
}

/// Handle to the session store. Clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Create a store seeded with `user`
    pub fn new(api: Arc<dyn NotesApi>, storage: LocalStorage, user: Option<User>) -> Self {
        let state = SessionState {
            user,
            status: RequestStatus::Idle,
        };

        Self {
            inner: Arc::new(SessionInner {
                api,
                storage,
                cell: StoreCell::new(state),
                commit: Mutex::new(()),
            }),
        }
    }

    /// Create a store seeded from the persisted session record.
    ///
    /// A record that can't be read is logged and treated as no session.
    pub async fn restore(api: Arc<dyn NotesApi>, storage: LocalStorage) -> Self {
        let user = match storage.get::<User>(SESSION_STORAGE_KEY).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Ignoring unreadable persisted session: {}", e);
                None
            }
        };

        match &user {
            Some(user) => tracing::info!("Restored session for {}", user.email),
            None => tracing::info!("No persisted session"),
        }

        Self::new(api, storage, user)
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.cell.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.cell.read(|state| state.user.clone())
    }

    /// Bearer token of the current user, if any
    pub fn token(&self) -> Option<String> {
        self.inner
            .cell
            .read(|state| state.user.as_ref().and_then(|user| user.token.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.cell.read(|state| state.user.is_some())
    }

    /// Register a new account and sign in as it
    pub async fn register(&self, req: RegisterRequest) {
        const ACTION: &str = "auth/register";

        let id = self.inner.cell.begin(ACTION);
        let result = self.inner.api.register(&req).await;
        self.settle(ACTION, id, result).await;
    }

    pub async fn login(&self, req: LoginRequest) {
        const ACTION: &str = "auth/login";

        let id = self.inner.cell.begin(ACTION);
        let result = self.inner.api.login(&req).await;
        self.settle(ACTION, id, result).await;
    }

    /// Forget the session in memory and in storage. Never fails; calling it
    /// again has no further effect.
    pub async fn logout(&self) {
        let _guard = self.inner.commit.lock().await;

        if let Err(e) = self.inner.storage.remove(SESSION_STORAGE_KEY).await {
            tracing::warn!("Failed to remove persisted session: {}", e);
        }

        self.inner.cell.modify(|state| state.user = None);
        tracing::info!("Logged out");
    }

    /// Clear the status without touching the user
    pub fn reset_status(&self) {
        self.inner.cell.reset_status();
    }

    /// Persist and apply a login/register outcome.
    ///
    /// On success the user is written to storage before it becomes visible; a
    /// storage failure rejects the action. On failure both copies are cleared.
    /// An outcome superseded by a newer login/register is dropped entirely, so
    /// the user, the status and the persisted record always come from the same
    /// action.
    async fn settle(&self, action: &'static str, id: RequestId, result: Result<User>) {
        let _guard = self.inner.commit.lock().await;

        if !self.inner.cell.is_latest(id) {
            tracing::debug!("{} {} settled after a newer request; discarded", action, id);
            return;
        }

        let result = match result {
            Ok(user) => self
                .inner
                .storage
                .set(SESSION_STORAGE_KEY, &user)
                .await
                .map(|()| user),
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                tracing::info!("Signed in as {}", user.email);
                self.inner
                    .cell
                    .fulfill(action, id, move |state| state.user = Some(user));
            }
            Err(e) => {
                if let Err(remove_err) = self.inner.storage.remove(SESSION_STORAGE_KEY).await {
                    tracing::warn!("Failed to remove persisted session: {}", remove_err);
                }
                self.inner
                    .cell
                    .reject(action, id, &e, |state| state.user = None);
            }
        }
    }
}
