use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::validation::{FieldErrors, Validate};
use crate::auth::Role;
use crate::database::repository::{Patchable, Table};

/// A portal user's profile. Created by the identity provider, never by this API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    /// Kept as text: rows may predate the current role set
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The only profile change the API supports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

impl Validate for RoleUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        // `Role` can only hold valid values
        Ok(())
    }
}

impl Table for Profile {
    const TABLE: &'static str = "profiles";
    const ENTITY_TYPE: &'static str = "user";
    const KEY_COLUMN: &'static str = "id";

    type Row = Profile;

    fn natural_key(row: &Profile) -> String {
        row.id.clone()
    }
}

impl Patchable for Profile {
    type Update = RoleUpdate;

    fn updated_summary(_key: &str, patch: &RoleUpdate) -> String {
        format!("Changed role to {}", patch.role)
    }
}
