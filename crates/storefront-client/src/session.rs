//! # Session Tokens
//!
//! Client-side view of the signed-in customer's JWT. The storefront never
//! holds the signing key: claims are decoded without verifying the
//! signature and used only to decide when to ask the user to sign in
//! again. The backend still verifies every request.
//!
//! ## Status Timeline
//! ```text
//!   iat                      exp - margin          exp
//!    │──────── Active ─────────────│── ExpiringSoon ─│── Expired ──►
//! ```
//!
//! [`watch_expiry`] publishes each transition on a `watch` channel so the
//! UI can prompt before the token lapses and sign out once it has.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

/// Lower bound on the watcher's sleep, so clock skew cannot make it spin.
const MIN_WAKE_INTERVAL: Duration = Duration::from_millis(20);

/// Claims the storefront reads from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,

    /// Expiration (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

/// Where a token is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    /// Within the configured margin of `exp`.
    ExpiringSoon,
    Expired,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::ExpiringSoon => write!(f, "expiring_soon"),
            SessionStatus::Expired => write!(f, "expired"),
        }
    }
}

/// A decoded session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    raw: String,
    claims: SessionClaims,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Decodes `raw` without verifying its signature.
    ///
    /// Fails on anything that is not a JWT carrying `sub` and `exp`. An
    /// already-expired token decodes fine; check [`Self::is_expired`].
    pub fn parse(raw: &str) -> ClientResult<Self> {
        let raw = raw.trim();

        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<SessionClaims>(raw, &DecodingKey::from_secret(&[]), &validation)?;
        let claims = data.claims;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or_else(|| {
            ClientError::InvalidToken(format!("exp out of range: {}", claims.exp))
        })?;

        debug!(sub = %claims.sub, %expires_at, "Session token decoded");

        Ok(SessionToken {
            raw: raw.to_string(),
            claims,
            expires_at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Status at `now`, treating the last `margin` before `exp` as
    /// expiring.
    pub fn status_at(&self, now: DateTime<Utc>, margin: Duration) -> SessionStatus {
        if now >= self.expires_at {
            SessionStatus::Expired
        } else if now + margin_delta(margin) >= self.expires_at {
            SessionStatus::ExpiringSoon
        } else {
            SessionStatus::Active
        }
    }

    pub fn status(&self, margin: Duration) -> SessionStatus {
        self.status_at(Utc::now(), margin)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whole seconds left at `now`, zero once expired.
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs_at(Utc::now())
    }

    /// Fails with [`ClientError::SessionExpired`] if the token has lapsed.
    pub fn ensure_active(&self) -> ClientResult<()> {
        if self.is_expired() {
            return Err(ClientError::SessionExpired);
        }
        Ok(())
    }

    /// When the status after `status` begins, if there is one.
    fn next_transition(&self, status: SessionStatus, margin: Duration) -> Option<DateTime<Utc>> {
        match status {
            SessionStatus::Active => Some(self.expires_at - margin_delta(margin)),
            SessionStatus::ExpiringSoon => Some(self.expires_at),
            SessionStatus::Expired => None,
        }
    }
}

/// Margins beyond a century are clamped so date arithmetic cannot overflow.
fn margin_delta(margin: Duration) -> chrono::Duration {
    let century = chrono::Duration::days(36_500);
    chrono::Duration::from_std(margin)
        .map(|m| m.min(century))
        .unwrap_or(century)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Expiry Watcher
// =============================================================================

/// Handle to a running expiry watcher.
#[derive(Debug)]
pub struct ExpiryWatcher {
    status: watch::Receiver<SessionStatus>,
    task: JoinHandle<()>,
}

impl ExpiryWatcher {
    /// Subscribes to status transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Latest published status.
    pub fn current(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Stops the watcher task.
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Spawns a task that publishes `token`'s status as it moves from Active
/// to ExpiringSoon to Expired.
///
/// The task sleeps until the next transition rather than polling, and
/// exits after publishing `Expired` or once every receiver is dropped.
pub fn watch_expiry(token: SessionToken, margin: Duration) -> ExpiryWatcher {
    let initial = token.status(margin);
    let (tx, rx) = watch::channel(initial);

    let task = tokio::spawn(async move {
        let mut status = initial;
        loop {
            let Some(deadline) = token.next_transition(status, margin) else {
                info!(sub = %token.user_id(), "Session expired");
                break;
            };

            let wait = (deadline - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
                .max(MIN_WAKE_INTERVAL);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = tx.closed() => {
                    debug!("Expiry watcher has no subscribers, stopping");
                    break;
                }
            }

            let next = token.status(margin);
            if next != status {
                debug!(from = %status, to = %next, "Session status changed");
                status = next;
                if tx.send(status).is_err() {
                    break;
                }
            }
        }
    });

    ExpiryWatcher { status: rx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_expiring_in(secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "user-7".into(),
            exp: now + secs,
            iat: Some(now),
            email: Some("ada@example.com".into()),
            role: Some("customer".into()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_without_key() {
        let raw = token_expiring_in(3600);
        let token = SessionToken::parse(&raw).unwrap();

        assert_eq!(token.user_id(), "user-7");
        assert_eq!(token.claims().email.as_deref(), Some("ada@example.com"));
        assert_eq!(token.as_str(), raw);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            SessionToken::parse("not-a-jwt"),
            Err(ClientError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_still_parses() {
        let token = SessionToken::parse(&token_expiring_in(-10)).unwrap();
        assert!(token.is_expired());
        assert_eq!(token.remaining_secs(), 0);
        assert!(matches!(
            token.ensure_active(),
            Err(ClientError::SessionExpired)
        ));
    }

    #[test]
    fn test_status_at() {
        let token = SessionToken::parse(&token_expiring_in(600)).unwrap();
        let exp = token.expires_at();
        let margin = Duration::from_secs(60);

        let early = exp - chrono::Duration::seconds(300);
        let late = exp - chrono::Duration::seconds(30);

        assert_eq!(token.status_at(early, margin), SessionStatus::Active);
        assert_eq!(token.status_at(late, margin), SessionStatus::ExpiringSoon);
        assert_eq!(token.status_at(exp, margin), SessionStatus::Expired);
        assert_eq!(token.remaining_secs_at(early), 300);
        assert!(token.is_expired_at(exp));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[tokio::test]
    async fn test_watch_already_expired() {
        let token = SessionToken::parse(&token_expiring_in(-5)).unwrap();
        let watcher = watch_expiry(token, Duration::from_secs(30));
        assert_eq!(watcher.current(), SessionStatus::Expired);
    }

    #[tokio::test]
    async fn test_watch_reaches_expired() {
        let token = SessionToken::parse(&token_expiring_in(2)).unwrap();
        let watcher = watch_expiry(token, Duration::from_secs(60));
        let mut rx = watcher.subscribe();

        assert_eq!(*rx.borrow(), SessionStatus::ExpiringSoon);

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("watcher published nothing")
            .unwrap();
        assert_eq!(*rx.borrow(), SessionStatus::Expired);
    }
}
