use crate::auth::AuthError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Login credentials read from a JSON file
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Loads credentials from a JSON file of the form
/// `{"user": "...", "password": "..."}`
///
/// # Errors
///
/// A missing file, invalid JSON or a missing key all yield
/// `AuthError::Credentials`.
pub fn load_credentials(path: &Path) -> Result<Credentials, AuthError> {
    let invalid = |reason: String| AuthError::Credentials {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
}
