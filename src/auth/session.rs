use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use tracing::error;

use super::gateway::{Session, SessionUser};
use super::middleware::AuthUser;
use crate::entity::profile::{self, Entity as ProfileEntity, UserRole};

/// What views know about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub profile: Option<profile::Model>,
    pub loading: bool,
}

impl SessionState {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: SessionUser, profile: Option<profile::Model>) -> Self {
        Self {
            user: Some(user),
            profile,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.profile.as_ref().map(|p| p.role)
    }
}

impl From<&Session> for SessionState {
    fn from(session: &Session) -> Self {
        SessionState::signed_in(session.user.clone(), Some(session.profile.clone()))
    }
}

/// Source of the current session, passed explicitly to whatever needs it.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current(&self) -> SessionState;
}

#[async_trait]
impl SessionProvider for SessionState {
    async fn current(&self) -> SessionState {
        self.clone()
    }
}

/// Resolves the session for a request from its verified token.
pub struct TokenSessionProvider<'a> {
    db: &'a DatabaseConnection,
    auth: Option<AuthUser>,
}

impl<'a> TokenSessionProvider<'a> {
    pub fn new(db: &'a DatabaseConnection, auth: Option<AuthUser>) -> Self {
        Self { db, auth }
    }

    /// Like `current`, but hands a failed profile lookup back to the caller
    /// instead of treating it as signed out.
    pub async fn load(&self) -> Result<SessionState, DbErr> {
        let Some(auth) = self.auth else {
            return Ok(SessionState::signed_out());
        };

        let state = match ProfileEntity::find_by_id(auth.id).one(self.db).await? {
            Some(profile) => {
                let user = SessionUser {
                    id: profile.id,
                    email: profile.email.clone(),
                };
                SessionState::signed_in(user, Some(profile))
            }
            None => SessionState::signed_out(),
        };
        Ok(state)
    }
}

#[async_trait]
impl SessionProvider for TokenSessionProvider<'_> {
    async fn current(&self) -> SessionState {
        self.load().await.unwrap_or_else(|err| {
            error!(user_id = ?self.auth.map(|a| a.id), error = %err, "failed to load session profile");
            SessionState::signed_out()
        })
    }
}
