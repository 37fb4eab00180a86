use std::str::FromStr;

use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use uuid::Uuid;

use crate::entity::profile::{self, Entity as ProfileEntity, UserRole};
use crate::model::global_error::{AppError, ErrorCode};

/// Things a role may be allowed to do. Call sites ask for a capability
/// instead of comparing role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AdminPanel,
    TriageReports,
    ManageRoles,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::AdminPanel => "admin-panel",
            Capability::TriageReports => "triage-reports",
            Capability::ManageRoles => "manage-roles",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin-panel" => Ok(Capability::AdminPanel),
            "triage-reports" => Ok(Capability::TriageReports),
            "manage-roles" => Ok(Capability::ManageRoles),
            other => Err(format!("unknown capability: {other}")),
        }
    }
}

impl UserRole {
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            UserRole::User => &[],
            UserRole::Admin => &[Capability::AdminPanel, Capability::TriageReports],
            UserRole::Superadmin => &[
                Capability::AdminPanel,
                Capability::TriageReports,
                Capability::ManageRoles,
            ],
        }
    }
}

pub fn has_capability(role: UserRole, capability: Capability) -> bool {
    role.capabilities().contains(&capability)
}

pub fn require_capability(role: UserRole, capability: Capability) -> Result<(), AppError> {
    if has_capability(role, capability) {
        Ok(())
    } else {
        tracing::debug!(role = role.as_str(), capability = capability.as_str(), "capability denied");
        Err(AppError::forbidden(ErrorCode::NotEnoughPermission))
    }
}

/// The role currently stored on the caller's profile. Tokens outlive role
/// changes, so permission checks read it from here.
pub async fn stored_role<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<UserRole, AppError> {
    ProfileEntity::find_by_id(user_id)
        .select_only()
        .column(profile::Column::Role)
        .into_tuple::<UserRole>()
        .one(db)
        .await?
        .ok_or_else(|| AppError::unauthorized(ErrorCode::AuthenticationFailed))
}

pub async fn authorize<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    capability: Capability,
) -> Result<UserRole, AppError> {
    let role = stored_role(db, user_id).await?;
    require_capability(role, capability)?;
    Ok(role)
}
