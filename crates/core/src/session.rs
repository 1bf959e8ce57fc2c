//! Authenticated identity types shared by the auth provider, the event bus,
//! and the user library.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Seconds before `expires_at` at which a session is already treated as
/// expired, so a token is never sent just as it runs out.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// An active session: the bearer token used for row-level access plus the
/// user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which `access_token` stops being valid.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token must be refreshed before use at `now`
    /// (Unix seconds). A session without an expiry never expires.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - EXPIRY_MARGIN_SECS <= now)
    }
}

/// Whether `user` may open the admin tools.
///
/// Emails are compared case-insensitively. An empty allow-list admits
/// nobody.
pub fn is_admin(user: &AuthUser, admin_emails: &[String]) -> bool {
    user.email.as_deref().is_some_and(|email| {
        admin_emails
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(email))
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn user(email: Option<&str>) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn listed_email_is_admin() {
        let admins = vec!["Admin@Example.com".to_string()];
        assert!(is_admin(&user(Some("admin@example.com")), &admins));
        assert!(!is_admin(&user(Some("guest@example.com")), &admins));
    }

    #[test]
    fn session_expires_inside_the_margin() {
        let session = Session {
            access_token: "tok".into(),
            refresh_token: None,
            expires_at: Some(1_000),
            user: user(None),
        };
        assert!(!session.is_expired(1_000 - EXPIRY_MARGIN_SECS - 1));
        assert!(session.is_expired(1_000 - EXPIRY_MARGIN_SECS));
        assert!(session.is_expired(2_000));

        let open_ended = Session {
            expires_at: None,
            ..session
        };
        assert!(!open_ended.is_expired(i64::MAX));
    }

    #[test]
    fn empty_allow_list_or_missing_email_is_not_admin() {
        assert!(!is_admin(&user(Some("admin@example.com")), &[]));
        assert!(!is_admin(&user(None), &["admin@example.com".to_string()]));
    }
}
