//! Persistent CLI session: server URL, bearer token, identity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use slate_core::models::User;

use crate::error::CliError;

const PROFILE_FILE_NAME: &str = "profile.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

pub fn default_profile_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slate")
        .join(PROFILE_FILE_NAME)
}

impl Profile {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_profile_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Profile(format!(
                "Failed to read profile at {}: {error}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|error| {
            CliError::Profile(format!(
                "Failed to parse profile at {}: {error}",
                path.display()
            ))
        })
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_profile_path();
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                CliError::Profile(format!(
                    "Failed to create profile directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized).map_err(|error| {
            CliError::Profile(format!(
                "Failed to write profile at {}: {error}",
                path.display()
            ))
        })
    }

    pub fn delete_at_path(path: &Path) -> Result<(), CliError> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Whether a usable credential is stored.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// The owner id recorded on locally created records. The server trusts
    /// the token subject instead, so this only has to be stable per device.
    pub fn owner_id(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| "local".to_string(), |user| user.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_profile_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROFILE_FILE_NAME);
        let profile = Profile::load_from_path(&path).unwrap();
        assert_eq!(profile, Profile::default());
        assert!(!profile.is_authenticated());
        assert_eq!(profile.owner_id(), "local");
    }

    #[test]
    fn profile_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PROFILE_FILE_NAME);

        let profile = Profile {
            api_base_url: Some("http://localhost:8080".to_string()),
            token: Some("token-abc".to_string()),
            user: Some(User {
                id: "user-1".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                created_at: 1_700_000_000_000,
            }),
        };
        profile.save_to_path(&path).unwrap();

        let loaded = Profile::load_from_path(&path).unwrap();
        assert_eq!(loaded, profile);
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.owner_id(), "user-1");
    }

    #[test]
    fn delete_removes_the_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROFILE_FILE_NAME);
        Profile::default().save_to_path(&path).unwrap();
        assert!(path.exists());

        Profile::delete_at_path(&path).unwrap();
        assert!(!path.exists());
        // Deleting again is a no-op.
        Profile::delete_at_path(&path).unwrap();
    }

    #[test]
    fn blank_token_does_not_count_as_authenticated() {
        let profile = Profile {
            token: Some("   ".to_string()),
            ..Profile::default()
        };
        assert!(!profile.is_authenticated());
    }
}
