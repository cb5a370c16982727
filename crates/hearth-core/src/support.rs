//! # Support-Access Sessions
//!
//! Time-boxed grants that let a support agent into a tenant's back office.
//!
//! Expiry is measured against a monotonic [`Instant`] captured at grant
//! time. The wall-clock `granted_at` / `expires_at` fields are for display
//! and never decide whether a session is live, so a clock change on the
//! host cannot extend or cut short a grant.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::validate_reason;

/// Shortest grant, in minutes.
pub const MIN_SESSION_MINUTES: u32 = 1;

/// Longest grant, in minutes (four hours).
pub const MAX_SESSION_MINUTES: u32 = 240;

/// Request to open a support session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupportGrant {
    pub agent: String,
    pub reason: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupportSession {
    pub id: String,
    pub tenant_id: String,
    pub agent: String,
    pub reason: String,
    pub duration_minutes: u32,
    #[ts(as = "String")]
    pub granted_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    #[ts(skip)]
    started: Instant,
}

impl SupportSession {
    pub fn grant(
        tenant_id: &str,
        request: SupportGrant,
        wall_now: DateTime<Utc>,
        started: Instant,
    ) -> CoreResult<Self> {
        if !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&request.duration_minutes) {
            return Err(ValidationError::OutOfRange {
                field: "duration".to_string(),
                min: MIN_SESSION_MINUTES as i64,
                max: MAX_SESSION_MINUTES as i64,
            }
            .into());
        }
        let agent = validate_reason("agent", &request.agent)?;
        let reason = validate_reason("reason", &request.reason)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            agent,
            reason,
            duration_minutes: request.duration_minutes,
            granted_at: wall_now,
            expires_at: wall_now + chrono::Duration::minutes(request.duration_minutes as i64),
            started,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes as u64 * 60)
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration()
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.duration()
            .saturating_sub(now.saturating_duration_since(self.started))
    }
}

/// Live support sessions for one process.
#[derive(Debug, Default)]
pub struct SupportSessions {
    sessions: HashMap<String, SupportSession>,
}

impl SupportSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(
        &mut self,
        tenant_id: &str,
        request: SupportGrant,
        wall_now: DateTime<Utc>,
        now: Instant,
    ) -> CoreResult<SupportSession> {
        let session = SupportSession::grant(tenant_id, request, wall_now, now)?;
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    /// Returns the session if it exists and has not expired.
    pub fn get(&self, id: &str, now: Instant) -> CoreResult<&SupportSession> {
        self.sessions
            .get(id)
            .filter(|s| !s.is_expired_at(now))
            .ok_or_else(|| CoreError::SupportSessionNotFound(id.to_string()))
    }

    /// Live sessions, soonest expiry first.
    pub fn active(&self, now: Instant) -> Vec<&SupportSession> {
        let mut live: Vec<_> = self
            .sessions
            .values()
            .filter(|s| !s.is_expired_at(now))
            .collect();
        live.sort_by_key(|s| s.remaining_at(now));
        live
    }

    pub fn revoke(&mut self, id: &str) -> CoreResult<SupportSession> {
        self.sessions
            .remove(id)
            .ok_or_else(|| CoreError::SupportSessionNotFound(id.to_string()))
    }

    /// Drops expired sessions and returns them.
    pub fn sweep(&mut self, now: Instant) -> Vec<SupportSession> {
        let expired: Vec<String> = self
            .sessions
            .values()
            .filter(|s| s.is_expired_at(now))
            .map(|s| s.id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| self.sessions.remove(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(minutes: u32) -> SupportGrant {
        SupportGrant {
            agent: "asha@support".into(),
            reason: "menu import issue".into(),
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_duration_bounds() {
        let now = Instant::now();
        assert!(SupportSession::grant("t", request(0), Utc::now(), now).is_err());
        assert!(SupportSession::grant("t", request(241), Utc::now(), now).is_err());
        assert!(SupportSession::grant("t", request(1), Utc::now(), now).is_ok());
        assert!(SupportSession::grant("t", request(240), Utc::now(), now).is_ok());
    }

    #[test]
    fn test_expiry_uses_monotonic_clock() {
        let start = Instant::now();
        let session = SupportSession::grant("t", request(30), Utc::now(), start).unwrap();

        assert!(!session.is_expired_at(start + Duration::from_secs(29 * 60)));
        assert!(session.is_expired_at(start + Duration::from_secs(30 * 60)));
        assert_eq!(
            session.remaining_at(start + Duration::from_secs(60)),
            Duration::from_secs(29 * 60)
        );
        assert_eq!(
            session.expires_at - session.granted_at,
            chrono::Duration::minutes(30)
        );
    }

    #[test]
    fn test_registry_sweep_and_revoke() {
        let start = Instant::now();
        let mut sessions = SupportSessions::new();
        let short = sessions.grant("t", request(5), Utc::now(), start).unwrap();
        let long = sessions.grant("t", request(60), Utc::now(), start).unwrap();

        let later = start + Duration::from_secs(10 * 60);
        assert!(sessions.get(&short.id, later).is_err());
        assert_eq!(sessions.active(later).len(), 1);

        let swept = sessions.sweep(later);
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].id, short.id);
        assert_eq!(sessions.len(), 1);

        sessions.revoke(&long.id).unwrap();
        assert!(sessions.is_empty());
        assert!(matches!(
            sessions.revoke(&long.id),
            Err(CoreError::SupportSessionNotFound(_))
        ));
    }
}
