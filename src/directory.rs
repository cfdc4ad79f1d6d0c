use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Public profile data for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserProfile {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Path of the user's public link-in-bio page.
    #[must_use]
    pub fn profile_path(&self) -> String {
        format!("/{}", urlencoding::encode(&self.username))
    }
}

/// Consumer-provided user lookup (the profile database).
///
/// The gate never calls this; pages use it to turn a session's user ID into
/// a public profile.
///
/// # Example
///
/// ```rust,ignore
/// impl UserDirectory for MyDb {
///     async fn fetch_user(
///         &self,
///         user_id: &UserId,
///     ) -> Result<Option<UserProfile>, Box<dyn std::error::Error + Send + Sync>> {
///         let doc = self.users.get(user_id.as_str()).await?;
///         Ok(doc.map(|d| UserProfile::new(d.username)))
///     }
/// }
/// ```
pub trait UserDirectory: Send + Sync + 'static {
    /// Look up a user. `Ok(None)` if no such user exists.
    fn fetch_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<UserProfile>, Box<dyn std::error::Error + Send + Sync>>>
    + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_path_is_escaped() {
        assert_eq!(UserProfile::new("jane").profile_path(), "/jane");
        assert_eq!(UserProfile::new("jane doe").profile_path(), "/jane%20doe");
    }

    #[test]
    fn display_name_builder() {
        let profile = UserProfile::new("jane").with_display_name("Jane D.");
        assert_eq!(profile.display_name.as_deref(), Some("Jane D."));
    }
}
