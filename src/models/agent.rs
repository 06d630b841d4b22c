use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered agent. `agent_id` is the generated business identifier,
/// distinct from the storage-assigned `id` used in URLs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub gender: String,
    pub date_of_birth: String,
    pub id_proof_file_path: Option<String>,
    pub address_proof_file_path: Option<String>,
    pub photo_file_path: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The closed set of document-upload slots an agent record carries.
/// Multipart file parts are matched to a slot by field name; anything else
/// is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSlot {
    IdProof,
    AddressProof,
    Photo,
}

impl DocumentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSlot::IdProof => "idProof",
            DocumentSlot::AddressProof => "addressProof",
            DocumentSlot::Photo => "photo",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "idProof" => Some(DocumentSlot::IdProof),
            "addressProof" => Some(DocumentSlot::AddressProof),
            "photo" => Some(DocumentSlot::Photo),
            _ => None,
        }
    }
}

/// Blob URLs keyed by slot, for inserts and merge updates.
#[derive(Debug, Clone, Default)]
pub struct DocumentPaths {
    pub id_proof: Option<String>,
    pub address_proof: Option<String>,
    pub photo: Option<String>,
}

impl DocumentPaths {
    pub fn set(&mut self, slot: DocumentSlot, url: String) {
        match slot {
            DocumentSlot::IdProof => self.id_proof = Some(url),
            DocumentSlot::AddressProof => self.address_proof = Some(url),
            DocumentSlot::Photo => self.photo = Some(url),
        }
    }
}

/// A validated agent draft ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub agent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub gender: String,
    pub date_of_birth: String,
    pub documents: DocumentPaths,
}

/// Partial update merged over an existing record; absent fields keep their
/// stored values.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub documents: DocumentPaths,
}

impl AgentUpdate {
    /// Picks the enumerated scalar attributes out of a parsed form; any
    /// other key is dropped.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            first_name: fields.get("firstName").cloned(),
            last_name: fields.get("lastName").cloned(),
            email: fields.get("email").cloned(),
            mobile_number: fields.get("mobileNumber").cloned(),
            gender: fields.get("gender").cloned(),
            date_of_birth: fields.get("dateOfBirth").cloned(),
            documents: DocumentPaths::default(),
        }
    }
}
