//! Login session service: device tracking and session revocation.

use sea_orm::Set;
use serde::Serialize;

use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{entities::login_session, repositories::SessionRepository};

/// A session as shown to its owner. The token never leaves the server
/// after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub ip: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub last_seen_at: chrono::DateTime<chrono::FixedOffset>,
    pub is_current: bool,
}

/// Session service for business logic.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    id_gen: IdGenerator,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(session_repo: SessionRepository) -> Self {
        Self {
            session_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a login: issue a bearer token and store the session with
    /// device labels parsed from the user agent.
    pub async fn record_login(
        &self,
        user_id: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<login_session::Model> {
        let parsed = user_agent.map(parse_user_agent).unwrap_or_default();
        let now = chrono::Utc::now();

        self.session_repo
            .create(login_session::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                token: Set(self.id_gen.generate_token()),
                ip: Set(ip.map(str::to_owned)),
                user_agent: Set(user_agent.map(str::to_owned)),
                device: Set(parsed.device),
                browser: Set(parsed.browser),
                os: Set(parsed.os),
                created_at: Set(now.into()),
                last_seen_at: Set(now.into()),
                revoked_at: Set(None),
            })
            .await
    }

    /// Resolve an active session from a bearer token.
    pub async fn authenticate(&self, token: &str) -> AppResult<login_session::Model> {
        self.session_repo
            .find_active_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Refresh `last_seen_at` for the session backing the current request.
    pub async fn touch(&self, session_id: &str) -> AppResult<()> {
        self.session_repo.touch_last_seen(session_id).await
    }

    /// Active sessions of a user, the current one flagged.
    pub async fn list(&self, user_id: &str, current_session_id: &str) -> AppResult<Vec<SessionView>> {
        let sessions = self.session_repo.find_active_by_user(user_id).await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionView {
                is_current: s.id == current_session_id,
                id: s.id,
                ip: s.ip,
                device: s.device,
                browser: s.browser,
                os: s.os,
                created_at: s.created_at,
                last_seen_at: s.last_seen_at,
            })
            .collect())
    }

    /// Revoke one of the caller's other sessions.
    ///
    /// The session backing the current request cannot be revoked here;
    /// that is what logout is for.
    pub async fn revoke(
        &self,
        user_id: &str,
        session_id: &str,
        current_session_id: &str,
    ) -> AppResult<()> {
        if session_id == current_session_id {
            return Err(AppError::BadRequest(
                "Cannot revoke the current session; use logout".to_string(),
            ));
        }

        let Some(found) = self.session_repo.find_by_id(session_id).await? else {
            return Err(AppError::NotFound("Session not found".to_string()));
        };
        if found.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        self.session_repo.revoke(session_id).await
    }

    /// Revoke the current session (logout).
    pub async fn logout(&self, session_id: &str) -> AppResult<()> {
        self.session_repo.revoke(session_id).await
    }

    /// Revoke every session of a user (logout everywhere).
    pub async fn logout_everywhere(&self, user_id: &str) -> AppResult<u64> {
        self.session_repo.revoke_all_for_user(user_id).await
    }
}

/// Device labels extracted from a User-Agent header.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}

/// Best-effort User-Agent classification.
///
/// Order matters: Edge and Opera embed "Chrome", Chrome embeds "Safari",
/// and iPads report "Mobile".
#[must_use]
pub fn parse_user_agent(user_agent: &str) -> ParsedUserAgent {
    let ua = user_agent.to_lowercase();

    let os = if ua.contains("android") {
        Some("Android")
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ios") {
        Some("iOS")
    } else if ua.contains("windows") {
        Some("Windows")
    } else if ua.contains("mac os") || ua.contains("macos") {
        Some("macOS")
    } else if ua.contains("linux") {
        Some("Linux")
    } else {
        None
    };

    let browser = if ua.contains("edg/") || ua.contains("edge") {
        Some("Edge")
    } else if ua.contains("opr/") || ua.contains("opera") {
        Some("Opera")
    } else if ua.contains("firefox") {
        Some("Firefox")
    } else if ua.contains("chrome") || ua.contains("crios") {
        Some("Chrome")
    } else if ua.contains("safari") {
        Some("Safari")
    } else {
        None
    };

    let device = if ua.contains("ipad") || ua.contains("tablet") {
        Some("tablet")
    } else if ua.contains("mobile") || ua.contains("iphone") || ua.contains("android") {
        Some("mobile")
    } else {
        Some("desktop")
    };

    ParsedUserAgent {
        device: device.map(str::to_owned),
        browser: browser.map(str::to_owned),
        os: os.map(str::to_owned),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn parses_desktop_chrome_on_windows() {
        let parsed = parse_user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
        );
        assert_eq!(parsed.device.as_deref(), Some("desktop"));
        assert_eq!(parsed.browser.as_deref(), Some("Chrome"));
        assert_eq!(parsed.os.as_deref(), Some("Windows"));
    }

    #[test]
    fn parses_mobile_safari_on_ios() {
        let parsed = parse_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
        );
        assert_eq!(parsed.device.as_deref(), Some("mobile"));
        assert_eq!(parsed.browser.as_deref(), Some("Safari"));
        assert_eq!(parsed.os.as_deref(), Some("iOS"));
    }

    #[test]
    fn edge_is_not_mistaken_for_chrome() {
        let parsed = parse_user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36 Edg/125.0.0.0",
        );
        assert_eq!(parsed.browser.as_deref(), Some("Edge"));
    }

    #[test]
    fn ipad_is_a_tablet() {
        let parsed = parse_user_agent(
            "Mozilla/5.0 (iPad; CPU OS 17_5 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
        );
        assert_eq!(parsed.device.as_deref(), Some("tablet"));
    }

    #[test]
    fn unknown_agent_defaults_to_desktop() {
        let parsed = parse_user_agent("curl/8.5.0");
        assert_eq!(parsed.device.as_deref(), Some("desktop"));
        assert_eq!(parsed.browser, None);
        assert_eq!(parsed.os, None);
    }

    #[tokio::test]
    async fn revoking_the_current_session_is_a_bad_request() {
        // No seeded results: the guard must fire before any lookup.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = SessionService::new(SessionRepository::new(db));

        let err = service
            .revoke("user1", "session1", "session1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
