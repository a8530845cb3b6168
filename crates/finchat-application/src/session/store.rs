use super::state::{SessionAction, SessionState};
use crate::coordinator::SessionCoordinator;
use crate::generation::IdentityGeneration;
use finchat_core::error::{FinchatError, Result};
use finchat_core::gateway::{BackendGateway, Credentials};
use finchat_core::session::{IdentityEvent, SessionInfo, SessionStatus, SessionUser, UserType};
use finchat_infrastructure::{IdentityStorage, PersistedIdentity};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub const CREATE_SESSION_FAILED: &str = "Failed to create session";
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Owns the client's identity: which session is active, whether it is
/// anonymous or authenticated, and the transitions between them.
///
/// Every identity change is persisted first, then bumps the
/// [`IdentityGeneration`], then is announced on the [`SessionCoordinator`].
pub struct SessionStore {
    state: RwLock<SessionState>,
    gateway: Arc<dyn BackendGateway>,
    identity: IdentityStorage,
    coordinator: Arc<SessionCoordinator>,
    generation: IdentityGeneration,
    init_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        identity: IdentityStorage,
        coordinator: Arc<SessionCoordinator>,
        generation: IdentityGeneration,
    ) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            gateway,
            identity,
            coordinator,
            generation,
            init_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status
    }

    pub fn generation(&self) -> &IdentityGeneration {
        &self.generation
    }

    async fn dispatch(&self, action: SessionAction) {
        self.state.write().await.apply(action);
    }

    /// Restores the persisted identity, or creates an anonymous session.
    ///
    /// Calling this again once an identity is established is a no-op, and
    /// concurrent callers are serialized so at most one anonymous session is
    /// created.
    pub async fn initialize(&self) -> Result<SessionState> {
        let _guard = self.init_lock.lock().await;

        {
            let state = self.state.read().await;
            if state.status.is_established() {
                tracing::debug!("Session already initialized ({:?})", state.status);
                return Ok(state.clone());
            }
        }

        match self.identity.has_visited().await {
            Ok(true) => self.dispatch(SessionAction::MarkVisited).await,
            Ok(false) => {}
            Err(err) => tracing::warn!("Failed to read visit marker: {}", err),
        }

        self.dispatch(SessionAction::Begin).await;

        if !self.restore_persisted().await {
            self.create_anonymous_session().await?;
        }

        Ok(self.state().await)
    }

    /// Validates a persisted token against the backend. Returns `false`
    /// when there is nothing usable to restore.
    async fn restore_persisted(&self) -> bool {
        let persisted = match self.identity.load().await {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!("Failed to read persisted identity: {}", err);
                return false;
            }
        };

        let info = match self.gateway.get_session().await {
            Ok(info) => info,
            Err(err) => {
                tracing::info!(
                    "Stored session {} was rejected ({}), starting anonymous session",
                    persisted.session_id,
                    err
                );
                return false;
            }
        };

        if info.session_id != persisted.session_id || info.user_type != persisted.user_type {
            if let Err(err) = self.identity.refresh(&info.session_id, info.user_type).await {
                tracing::warn!("Failed to refresh persisted identity: {}", err);
            }
        }

        tracing::info!(
            "Restored {} session {}",
            info.user_type,
            info.session_id
        );
        self.dispatch(SessionAction::Established {
            user: SessionUser {
                user_type: info.user_type,
                session_id: info.session_id.clone(),
            },
            session: Some(info),
        })
        .await;
        self.dispatch(SessionAction::MarkVisited).await;
        true
    }

    /// Obtains and persists a fresh anonymous identity.
    pub async fn create_anonymous_session(&self) -> Result<()> {
        self.dispatch(SessionAction::Begin).await;

        match self.establish_anonymous().await {
            Ok(session_id) => {
                tracing::info!("Created anonymous session {}", session_id);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to create anonymous session: {}", err);
                self.dispatch(SessionAction::Failed(CREATE_SESSION_FAILED.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    async fn establish_anonymous(&self) -> Result<String> {
        let auth = self.gateway.create_anonymous_session().await?;
        if auth.token.is_empty() || auth.session_id.is_empty() {
            return Err(FinchatError::auth("Backend returned no anonymous session"));
        }

        self.persist_identity(&PersistedIdentity {
            token: auth.token,
            session_id: auth.session_id.clone(),
            user_type: UserType::Anonymous,
        })
        .await?;
        let generation = self.generation.bump();

        // The identity is already persisted, so it is established even
        // without session details.
        let session = match self.gateway.get_session().await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!(
                    "Anonymous session {} created but session details are unavailable: {}",
                    auth.session_id,
                    err
                );
                None
            }
        };
        self.dispatch(SessionAction::Established {
            user: SessionUser {
                user_type: UserType::Anonymous,
                session_id: auth.session_id.clone(),
            },
            session,
        })
        .await;
        self.dispatch(SessionAction::MarkVisited).await;

        self.coordinator
            .publish(&IdentityEvent::Changed {
                session_id: auth.session_id.clone(),
                user_type: UserType::Anonymous,
                generation,
                history: None,
            })
            .await;

        Ok(auth.session_id)
    }

    /// Saves `identity`. A failed save may leave a mix of old and new keys
    /// behind, so the stored identity is wiped and announced as logged out
    /// before the error is returned.
    async fn persist_identity(&self, identity: &PersistedIdentity) -> Result<()> {
        let Err(err) = self.identity.save(identity).await else {
            return Ok(());
        };

        tracing::error!(
            "Failed to persist session {}: {}",
            identity.session_id,
            err
        );
        if let Err(clear_err) = self.identity.clear().await {
            tracing::warn!("Failed to clear partially persisted identity: {}", clear_err);
        }
        self.dispatch(SessionAction::LoggedOut).await;
        let generation = self.generation.bump();
        self.coordinator
            .publish(&IdentityEvent::LoggedOut { generation })
            .await;
        Err(err)
    }

    /// Exchanges credentials for an authenticated identity.
    ///
    /// Returns `false` with a user-facing error on any failure. The previous
    /// identity stays in effect unless the new one could not be persisted.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.dispatch(SessionAction::SetError(None)).await;
        self.dispatch(SessionAction::SetLoading(true)).await;

        match self.authenticate(Credentials::new(email, password)).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Login for {} failed: {}", email, err);
                self.dispatch(SessionAction::Rejected(LOGIN_FAILED.to_string()))
                    .await;
                false
            }
        }
    }

    async fn authenticate(&self, credentials: Credentials) -> Result<()> {
        let auth = self.gateway.login(&credentials).await?;
        if !auth.success {
            return Err(FinchatError::auth(auth.message));
        }
        if auth.token.is_empty() || auth.session_id.is_empty() {
            return Err(FinchatError::auth("Backend returned no session"));
        }

        self.persist_identity(&PersistedIdentity {
            token: auth.token,
            session_id: auth.session_id.clone(),
            user_type: auth.user_type,
        })
        .await?;
        let generation = self.generation.bump();

        let session = match self.gateway.get_session().await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!("Logged in but session details are unavailable: {}", err);
                None
            }
        };

        self.dispatch(SessionAction::Established {
            user: SessionUser {
                user_type: auth.user_type,
                session_id: auth.session_id.clone(),
            },
            session,
        })
        .await;
        self.dispatch(SessionAction::MarkVisited).await;
        tracing::info!("Logged in as {} (session {})", credentials.email, auth.session_id);

        self.coordinator
            .publish(&IdentityEvent::Changed {
                session_id: auth.session_id,
                user_type: auth.user_type,
                generation,
                history: auth.history,
            })
            .await;
        Ok(())
    }

    /// Drops the current identity and falls back to a new anonymous session.
    ///
    /// Backend failures are logged and never block the local logout.
    pub async fn logout(&self) {
        if let Err(err) = self.gateway.logout().await {
            tracing::warn!("Backend logout failed, continuing locally: {}", err);
        }
        if let Err(err) = self.identity.clear().await {
            tracing::warn!("Failed to clear persisted identity: {}", err);
        }

        self.dispatch(SessionAction::LoggedOut).await;
        let generation = self.generation.bump();
        tracing::info!("Logged out");
        self.coordinator
            .publish(&IdentityEvent::LoggedOut { generation })
            .await;

        if let Err(err) = self.create_anonymous_session().await {
            tracing::warn!("No anonymous session after logout: {}", err);
        }
    }

    /// Re-validates the current session, replacing it with an anonymous one
    /// if the backend no longer accepts it.
    pub async fn check_session(&self) -> Result<Option<SessionInfo>> {
        match self.gateway.get_session().await {
            Ok(info) => {
                self.dispatch(SessionAction::Refreshed(info.clone())).await;
                Ok(Some(info))
            }
            Err(err) => {
                tracing::info!("Session check failed ({}), creating anonymous session", err);
                self.create_anonymous_session().await?;
                Ok(None)
            }
        }
    }
}
