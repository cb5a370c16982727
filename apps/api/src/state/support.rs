//! # Support Session State
//!
//! Live support-access grants for this tenant.
//!
//! ## Expiry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /support/sessions ──► grant (Instant captured) ──┐               │
//! │                                                         ▼               │
//! │                                             ┌─────────────────────┐     │
//! │  sweeper (every 1s) ─── sweep(now) ───────► │ SupportSessions     │     │
//! │                                             │ (Arc<Mutex<..>>)    │     │
//! │  GET /support/sessions ── active(now) ────► └─────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads filter on expiry too, so a session is gone the moment its time
//! runs out even if the sweeper has not fired yet.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

use hearth_core::support::{SupportGrant, SupportSession, SupportSessions};
use hearth_core::CoreResult;

/// How often expired sessions are dropped.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Support sessions shared between handlers and the sweeper.
#[derive(Debug, Clone)]
pub struct SupportState {
    tenant_id: String,
    sessions: Arc<Mutex<SupportSessions>>,
}

impl SupportState {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        SupportState {
            tenant_id: tenant_id.into(),
            sessions: Arc::new(Mutex::new(SupportSessions::new())),
        }
    }

    /// Runs `f` with the session map locked.
    ///
    /// The map is never left half-updated, so a poisoned lock is recovered.
    fn with_sessions<R>(&self, f: impl FnOnce(&mut SupportSessions) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut sessions)
    }

    pub fn grant(&self, request: SupportGrant) -> CoreResult<SupportSession> {
        let session = self.with_sessions(|s| {
            s.grant(&self.tenant_id, request, Utc::now(), Instant::now())
        })?;
        info!(
            session_id = %session.id,
            agent = %session.agent,
            minutes = session.duration_minutes,
            "Support session granted"
        );
        Ok(session)
    }

    pub fn get(&self, id: &str) -> CoreResult<SupportSession> {
        self.with_sessions(|s| s.get(id, Instant::now()).cloned())
    }

    pub fn active(&self) -> Vec<SupportSession> {
        self.with_sessions(|s| s.active(Instant::now()).into_iter().cloned().collect())
    }

    pub fn revoke(&self, id: &str) -> CoreResult<SupportSession> {
        let session = self.with_sessions(|s| s.revoke(id))?;
        info!(session_id = %session.id, agent = %session.agent, "Support session revoked");
        Ok(session)
    }

    /// Drops expired sessions as of `now`.
    pub fn sweep(&self, now: Instant) -> usize {
        let expired = self.with_sessions(|s| s.sweep(now));
        for session in &expired {
            info!(session_id = %session.id, agent = %session.agent, "Support session expired");
        }
        expired.len()
    }

    /// Spawns the background task that sweeps every `period`.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.sweep(Instant::now());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(minutes: u32) -> SupportGrant {
        SupportGrant {
            agent: "asha@support".into(),
            reason: "Printer mapping".into(),
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_grant_get_revoke() {
        let state = SupportState::new("tenant-1");
        let session = state.grant(grant(30)).unwrap();
        assert_eq!(session.tenant_id, "tenant-1");
        assert_eq!(state.get(&session.id).unwrap().id, session.id);
        assert_eq!(state.active().len(), 1);

        state.revoke(&session.id).unwrap();
        assert!(state.get(&session.id).is_err());
        assert!(state.revoke(&session.id).is_err());
    }

    #[test]
    fn test_sweep_drops_only_expired() {
        let state = SupportState::new("tenant-1");
        state.grant(grant(1)).unwrap();
        state.grant(grant(60)).unwrap();

        assert_eq!(state.sweep(Instant::now()), 0);
        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(state.sweep(later), 1);
        assert_eq!(state.active().len(), 1);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let state = SupportState::new("tenant-1");
        assert!(state.grant(grant(0)).is_err());
        assert!(state.grant(grant(241)).is_err());
        assert!(state.active().is_empty());
    }
}
