//! Directory snapshot schema - companies and users known to the identity service

use serde::{Deserialize, Serialize};

use super::bordereau::{OrgId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub org_id: OrgId,

    #[serde(default)]
    pub name: String,

    /// Secret numeric code used for delegated signing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,

    /// Opted in to transport takeover without any producer signature
    #[serde(default)]
    pub allows_takeover_without_signature: bool,

    #[serde(default)]
    pub members: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,

    #[serde(default)]
    pub name: String,
}

/// Serialized content of the identity service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,

    #[serde(default)]
    pub users: Vec<UserRecord>,
}
