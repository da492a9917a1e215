//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (may be None if not shared)
    #[serde(default)]
    pub email: Option<String>,
}
