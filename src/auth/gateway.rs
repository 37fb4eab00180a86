use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::jwt::JwtUtils;
use crate::entity::profile::{self, Entity as ProfileEntity};
use crate::entity::user::{self, Entity as UserEntity};
use crate::model::global_error::{AppError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// A signed-in session as handed back by the gateway.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
    pub profile: profile::Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("an account with this email already exists")]
    DuplicateAccount,
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Other(String),
}

impl From<DbErr> for GatewayError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => GatewayError::DuplicateAccount,
            _ => GatewayError::Other(err.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::DuplicateAccount => AppError::new(ErrorCode::DuplicateAccountEmail),
            GatewayError::InvalidCredentials => AppError::bad_request(ErrorCode::InvalidEmailPwd),
            // Backend text stays in the logs.
            GatewayError::Other(detail) => {
                tracing::error!(error = %detail, "auth gateway failed");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, GatewayError>;

    async fn sign_out(&self, user_id: Uuid);
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Gateway backed by the `users`/`profiles` tables with bcrypt hashes and
/// JWT sessions.
#[derive(Clone)]
pub struct DbAuthGateway {
    db: Arc<DatabaseConnection>,
    jwt: JwtUtils,
    hash_cost: u32,
}

impl DbAuthGateway {
    pub fn new(db: Arc<DatabaseConnection>, jwt: JwtUtils) -> Self {
        Self {
            db,
            jwt,
            hash_cost: DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn issue(&self, user: SessionUser, profile: profile::Model) -> Result<Session, GatewayError> {
        let access_token = self
            .jwt
            .generate_token(user.id, profile.role)
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(user.id)
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        Ok(Session {
            access_token,
            refresh_token,
            user,
            profile,
        })
    }
}

#[async_trait]
impl AuthGateway for DbAuthGateway {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let email = normalize_email(email);

        let user = UserEntity::find()
            .filter(user::Column::Email.eq(&email))
            .one(self.db.as_ref())
            .await?
            .ok_or(GatewayError::InvalidCredentials)?;

        let is_valid =
            verify(password, &user.password).map_err(|e| GatewayError::Other(e.to_string()))?;
        if !is_valid {
            warn!(user_id = %user.id, "password mismatch");
            return Err(GatewayError::InvalidCredentials);
        }

        let profile = ProfileEntity::find_by_id(user.id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| GatewayError::Other("profile missing for account".to_string()))?;

        info!(user_id = %user.id, "signed in");
        self.issue(
            SessionUser {
                id: user.id,
                email: user.email,
            },
            profile,
        )
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, GatewayError> {
        let email = normalize_email(email);
        let txn = self.db.begin().await?;

        let existing = UserEntity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&txn)
            .await?;
        if existing.is_some() {
            txn.rollback().await.ok();
            return Err(GatewayError::DuplicateAccount);
        }

        let hashed_password =
            hash(password, self.hash_cost).map_err(|e| GatewayError::Other(e.to_string()))?;

        let id = Uuid::new_v4();
        let user = user::ActiveModel {
            id: Set(id),
            email: Set(email.clone()),
            password: Set(hashed_password),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let full_name = Some(full_name.trim().to_string()).filter(|n| !n.is_empty());
        let profile = profile::ActiveModel::new_for_identity(id, &email, full_name)
            .insert(&txn)
            .await?;

        txn.commit().await?;

        info!(user_id = %id, "account created");
        self.issue(
            SessionUser {
                id: user.id,
                email: user.email,
            },
            profile,
        )
    }

    async fn sign_out(&self, user_id: Uuid) {
        // Tokens are stateless; the client drops its cookies.
        info!(%user_id, "signed out");
    }
}
