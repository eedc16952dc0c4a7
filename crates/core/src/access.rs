//! Tenant scoping and role-based access rules.
//!
//! Every request is evaluated against a [`Principal`]. Two questions are
//! answered separately:
//!
//! - *which rows may the caller see* ([`Principal::scope`]), turned into an
//!   organization filter for repository queries;
//! - *what may the caller do* ([`Principal::can`]) with a resource kind.
//!
//! An object outside the caller's scope is reported as not found, never as
//! forbidden, so tenants cannot discover each other's ids.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// The authenticated caller as seen by access checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role: Role,
    pub is_superuser: bool,
    pub organization_id: Option<DbId>,
}

/// The set of organizations whose data a principal may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every organization.
    Global,
    /// A single organization.
    Organization(DbId),
    /// No organization: a client user not yet assigned to a tenant.
    Nothing,
}

/// What the caller wants to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// Resource kinds subject to access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Organization,
    Zone,
    Device,
    Measurement,
    Alert,
    User,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Organization => "organizations",
            Resource::Zone => "zones",
            Resource::Device => "devices",
            Resource::Measurement => "measurements",
            Resource::Alert => "alerts",
            Resource::User => "users",
        }
    }
}

impl Principal {
    /// Superusers and platform managers operate across all organizations.
    pub fn is_global(&self) -> bool {
        self.is_superuser || self.role == Role::PlatformManager
    }

    pub fn scope(&self) -> Scope {
        if self.is_global() {
            return Scope::Global;
        }
        match self.organization_id {
            Some(id) => Scope::Organization(id),
            None => Scope::Nothing,
        }
    }

    /// Whether the principal's role permits `action` on `resource`.
    ///
    /// This says nothing about *which* rows; combine with [`Principal::scope`].
    pub fn can(&self, action: Action, resource: Resource) -> bool {
        if self.is_global() {
            return true;
        }
        match (self.role, action, resource) {
            (_, _, Resource::User) => false,
            (_, Action::Write, Resource::Organization) => false,
            (_, Action::Read, _) => true,
            (Role::ClientAdmin, Action::Write, _) => true,
            (Role::ClientTechnician, Action::Write, Resource::Measurement) => true,
            _ => false,
        }
    }

    /// Like [`Principal::can`] but returns `Forbidden` on denial.
    pub fn require(&self, action: Action, resource: Resource) -> Result<(), CoreError> {
        if self.can(action, resource) {
            Ok(())
        } else {
            let verb = match action {
                Action::Read => "view",
                Action::Write => "modify",
            };
            Err(CoreError::Forbidden(format!(
                "Role '{}' may not {verb} {}",
                self.role,
                resource.name()
            )))
        }
    }
}

impl Scope {
    /// Translate the scope into a repository organization filter.
    ///
    /// - `None`: the caller sees nothing; skip the query entirely.
    /// - `Some(None)`: no filter.
    /// - `Some(Some(id))`: restrict to one organization.
    pub fn org_filter(&self) -> Option<Option<DbId>> {
        match self {
            Scope::Global => Some(None),
            Scope::Organization(id) => Some(Some(*id)),
            Scope::Nothing => None,
        }
    }

    /// Whether a row owned by `organization_id` is visible in this scope.
    pub fn contains(&self, organization_id: DbId) -> bool {
        match self {
            Scope::Global => true,
            Scope::Organization(id) => *id == organization_id,
            Scope::Nothing => false,
        }
    }

    /// Decide which organization owns a newly created zone.
    ///
    /// Global callers must name the organization. Organization callers get
    /// their own, and naming another one is forbidden.
    pub fn resolve_owner(&self, requested: Option<DbId>) -> Result<DbId, CoreError> {
        match (self, requested) {
            (Scope::Global, Some(id)) => Ok(id),
            (Scope::Global, None) => Err(CoreError::field(
                "organization_id",
                "organization_id is required",
            )),
            (Scope::Organization(own), None) => Ok(*own),
            (Scope::Organization(_), Some(id)) if self.contains(id) => Ok(id),
            (Scope::Organization(_), Some(_)) => Err(CoreError::Forbidden(
                "Cannot create records for another organization".into(),
            )),
            (Scope::Nothing, _) => Err(CoreError::Forbidden(
                "User is not assigned to an organization".into(),
            )),
        }
    }
}
