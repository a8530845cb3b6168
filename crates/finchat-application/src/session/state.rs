use finchat_core::session::{SessionInfo, SessionStatus, SessionUser, UserType};

/// Observable state of the session store.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<SessionUser>,
    pub session: Option<SessionInfo>,
    pub is_first_time_user: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            user: None,
            session: None,
            is_first_time_user: true,
            is_loading: false,
            error: None,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn session_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.session_id.as_str())
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user.as_ref().map(|user| user.user_type)
    }

    /// Applies `action` as a single atomic update.
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::Begin => {
                self.transition(SessionStatus::Loading);
                self.is_loading = true;
                self.error = None;
            }
            SessionAction::SetLoading(loading) => self.is_loading = loading,
            SessionAction::SetError(error) => self.error = error,
            SessionAction::Established { user, session } => {
                self.transition(SessionStatus::established(user.user_type));
                self.user = Some(user);
                self.session = session;
                self.is_loading = false;
                self.error = None;
            }
            SessionAction::Refreshed(info) => {
                self.transition(SessionStatus::established(info.user_type));
                self.user = Some(SessionUser {
                    user_type: info.user_type,
                    session_id: info.session_id.clone(),
                });
                self.session = Some(info);
                self.is_loading = false;
            }
            SessionAction::Rejected(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            SessionAction::Failed(message) => {
                self.transition(SessionStatus::Error);
                self.is_loading = false;
                self.error = Some(message);
            }
            SessionAction::LoggedOut => {
                self.transition(SessionStatus::Uninitialized);
                self.user = None;
                self.session = None;
                self.is_first_time_user = true;
                self.is_loading = false;
                self.error = None;
            }
            SessionAction::MarkVisited => self.is_first_time_user = false,
        }
    }

    fn transition(&mut self, next: SessionStatus) {
        if self.status == next || self.status.can_transition_to(next) {
            self.status = next;
            return;
        }

        if self.status == SessionStatus::Error {
            tracing::debug!("Leaving Error through Loading before {:?}", next);
            self.status = SessionStatus::Loading;
            if self.status.can_transition_to(next) {
                self.status = next;
                return;
            }
        }

        tracing::warn!(
            "Unexpected session transition {:?} -> {:?}",
            self.status,
            next
        );
        self.status = next;
    }
}

/// Updates accepted by [`SessionState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Initialization or anonymous-session creation started.
    Begin,
    SetLoading(bool),
    SetError(Option<String>),
    /// A new identity was persisted and is now in effect.
    Established {
        user: SessionUser,
        session: Option<SessionInfo>,
    },
    /// The backend confirmed the current session.
    Refreshed(SessionInfo),
    /// A user-initiated operation failed without changing the identity.
    Rejected(String),
    /// Establishing any identity failed.
    Failed(String),
    LoggedOut,
    MarkVisited,
}
