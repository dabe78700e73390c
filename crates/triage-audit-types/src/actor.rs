//! Security event actors.

use serde::{Deserialize, Serialize};
use triage_common_core::UserId;

/// The entity a security event is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityActor {
    /// An authenticated user.
    User {
        user_id: UserId,
        username: Option<String>,
    },
    /// The system itself (automated processes).
    System { component: String },
    /// An unauthenticated or unresolved caller.
    Anonymous,
}

impl SecurityActor {
    /// Create a user actor.
    pub fn user(user_id: UserId) -> Self {
        Self::User {
            user_id,
            username: None,
        }
    }

    /// Create a user actor with a username.
    pub fn named_user(user_id: UserId, username: impl Into<String>) -> Self {
        Self::User {
            user_id,
            username: Some(username.into()),
        }
    }

    /// Create a system actor.
    pub fn system(component: impl Into<String>) -> Self {
        Self::System {
            component: component.into(),
        }
    }

    /// Get a display identifier for this actor.
    pub fn identifier(&self) -> String {
        match self {
            Self::User { user_id, username } => {
                username.clone().unwrap_or_else(|| user_id.to_string())
            }
            Self::System { component } => format!("system:{}", component),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_identifier() {
        let id = UserId::new();
        assert_eq!(
            SecurityActor::named_user(id, "mallory").identifier(),
            "mallory"
        );
        assert_eq!(SecurityActor::user(id).identifier(), id.to_string());
        assert_eq!(SecurityActor::system("drain").identifier(), "system:drain");
        assert_eq!(SecurityActor::Anonymous.identifier(), "anonymous");
    }
}
