use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a logged-in user, as written by the login flow.
///
/// Never empty: [`SessionGate`](crate::SessionGate) only builds one from a
/// non-empty stored value, kept byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Outcome of a session check.
///
/// Serializes as `{"state":"Authenticated","userId":"..."}` or
/// `{"state":"Unauthenticated"}` for page components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum SessionResult {
    Authenticated {
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    Unauthenticated,
}

impl SessionResult {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated { user_id } => Some(user_id),
            Self::Unauthenticated => None,
        }
    }
}

/// How a caller reacts to a missing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GateMode {
    /// Navigate to the login page when there is no session.
    #[default]
    Strict,
    /// Report the absence and let the caller decide.
    Tolerant,
}
