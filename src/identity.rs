//! Identity and authorization service
//!
//! Answers "does user X belong to organization Y" and "what is Y's secret
//! code". The engine only reads from it.

use std::collections::HashMap;

use crate::schemas::{CompanyRecord, DirectorySnapshot, OrgId, UserId, UserRecord};

/// Read-only view of companies and their members
pub trait Directory: Send + Sync {
    /// Whether the user is a member of the organization
    fn is_member(&self, user: &UserId, org: &OrgId) -> bool;

    /// Current secret code of the organization, if it has one
    fn security_code(&self, org: &OrgId) -> Option<String>;

    /// Whether the organization opted in to takeover without signature
    fn allows_takeover_without_signature(&self, org: &OrgId) -> bool;

    /// Display name of the user, if known
    fn user_name(&self, user: &UserId) -> Option<String>;
}

/// Directory held in memory, usually built from a JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    companies: HashMap<OrgId, CompanyRecord>,
    users: HashMap<UserId, UserRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        let mut directory = InMemoryDirectory::new();
        for company in snapshot.companies {
            directory = directory.with_company(company);
        }
        for user in snapshot.users {
            directory = directory.with_user(user);
        }
        directory
    }

    pub fn with_company(mut self, company: CompanyRecord) -> Self {
        self.companies.insert(company.org_id.clone(), company);
        self
    }

    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub fn company(&self, org: &OrgId) -> Option<&CompanyRecord> {
        self.companies.get(org)
    }
}

impl Directory for InMemoryDirectory {
    fn is_member(&self, user: &UserId, org: &OrgId) -> bool {
        self.companies
            .get(org)
            .map_or(false, |company| company.members.contains(user))
    }

    fn security_code(&self, org: &OrgId) -> Option<String> {
        self.companies
            .get(org)
            .and_then(|company| company.security_code.clone())
    }

    fn allows_takeover_without_signature(&self, org: &OrgId) -> bool {
        self.companies
            .get(org)
            .map_or(false, |company| company.allows_takeover_without_signature)
    }

    fn user_name(&self, user: &UserId) -> Option<String> {
        self.users
            .get(user)
            .map(|u| u.name.clone())
            .filter(|name| !name.is_empty())
    }
}
