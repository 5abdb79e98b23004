//! Actor schemas - the parties appearing on a bordereau

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bordereau::OrgId;

/// Identity and contact block shared by every role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Organization identity used for authorization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<OrgId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
}

impl CompanyInfo {
    /// A fully filled company block, mostly for fixtures and imports
    pub fn named(org_id: &str, name: &str) -> Self {
        CompanyInfo {
            org_id: Some(OrgId::from(org_id)),
            name: Some(name.to_string()),
            address: Some(format!("1 rue de {}", name)),
            contact: Some("Contact".to_string()),
            phone: Some("0102030405".to_string()),
            mail: Some(format!("contact@{}.test", org_id)),
        }
    }
}

/// The party whose waste is shipped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    #[serde(default)]
    pub company: CompanyInfo,

    /// Private individuals have no organization and cannot sign
    #[serde(default)]
    pub is_private_individual: bool,
}

/// Transport receipt (récépissé) held by a transporter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_limit: Option<DateTime<Utc>>,
}

/// Transport mode of one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    #[default]
    Road,
    Rail,
    Air,
    River,
    Sea,
    Other,
}

/// One transport leg; documents may carry several (multimodal)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transporter {
    #[serde(default)]
    pub company: CompanyInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransportReceipt>,

    /// Receipt fields are not required when set
    #[serde(default)]
    pub is_exempted_of_receipt: bool,

    #[serde(default)]
    pub mode: TransportMode,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plates: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_over_at: Option<DateTime<Utc>>,
}

impl Transporter {
    pub fn org_id(&self) -> Option<&OrgId> {
        self.company.org_id.as_ref()
    }
}

/// Every role of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actors {
    #[serde(default)]
    pub producer: Producer,

    /// Worker company (asbestos removal contractor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<CompanyInfo>,

    #[serde(default)]
    pub transporters: Vec<Transporter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<CompanyInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediaries: Vec<CompanyInfo>,

    /// Eco-organisme acting as delegate for the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco_organisme: Option<CompanyInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<CompanyInfo>,
}

impl Actors {
    pub fn producer_org(&self) -> Option<&OrgId> {
        self.producer.company.org_id.as_ref()
    }

    pub fn worker_org(&self) -> Option<&OrgId> {
        self.worker.as_ref().and_then(|w| w.org_id.as_ref())
    }

    pub fn destination_org(&self) -> Option<&OrgId> {
        self.destination.as_ref().and_then(|d| d.org_id.as_ref())
    }

    pub fn eco_organisme_org(&self) -> Option<&OrgId> {
        self.eco_organisme.as_ref().and_then(|e| e.org_id.as_ref())
    }

    /// Transporter at a 1-based position
    pub fn transporter(&self, number: u8) -> Option<&Transporter> {
        (number as usize)
            .checked_sub(1)
            .and_then(|index| self.transporters.get(index))
    }

    /// Every organization appearing on the document, in role order
    pub fn all_orgs(&self) -> Vec<&OrgId> {
        let mut orgs = Vec::new();
        orgs.extend(self.producer_org());
        orgs.extend(self.worker_org());
        orgs.extend(self.transporters.iter().filter_map(|t| t.org_id()));
        orgs.extend(self.destination_org());
        orgs.extend(self.intermediaries.iter().filter_map(|i| i.org_id.as_ref()));
        orgs.extend(self.eco_organisme_org());
        orgs.extend(self.broker.as_ref().and_then(|b| b.org_id.as_ref()));
        orgs
    }
}
