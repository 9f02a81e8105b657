use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::validation::{check_email, patch_not_null, require_text, FieldErrors, Validate};
use crate::database::repository::{Creatable, Patchable, Table};
use crate::types::Patch;

fn default_status() -> String {
    "Active".to_string()
}

/// A client row as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub client_code: String,
    pub client_name: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub relationship_partner: Option<Uuid>,
    #[serde(default)]
    pub primary_contact_name: Option<String>,
    #[serde(default)]
    pub primary_contact_email: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// New client. `client_code` may be left for the store to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_partner: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact_email: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Validate for ClientCreate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "client_name", &self.client_name);
        if let Some(code) = &self.client_code {
            require_text(&mut errors, "client_code", code);
        }
        check_email(&mut errors, "primary_contact_email", self.primary_contact_email.as_ref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub client_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub group_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub industry: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub relationship_partner: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub primary_contact_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub primary_contact_email: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub status: Patch<String>,
}

impl Validate for ClientUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        patch_not_null(&mut errors, "client_name", &self.client_name);
        patch_not_null(&mut errors, "status", &self.status);
        if let Some(name) = self.client_name.as_value() {
            require_text(&mut errors, "client_name", name);
        }
        check_email(&mut errors, "primary_contact_email", self.primary_contact_email.as_value());
        errors.into_result()
    }
}

impl Table for Client {
    const TABLE: &'static str = "clients";
    const ENTITY_TYPE: &'static str = "client";
    const KEY_COLUMN: &'static str = "client_code";

    type Row = Client;

    fn natural_key(row: &Client) -> String {
        row.client_code.clone()
    }
}

impl Creatable for Client {
    type Create = ClientCreate;

    fn created_summary(row: &Client) -> String {
        format!("Created client: {}", row.client_name)
    }
}

impl Patchable for Client {
    type Update = ClientUpdate;
}
