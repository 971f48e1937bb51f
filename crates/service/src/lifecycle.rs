use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

use crate::errors::ServiceError;

pub const DISABLED_MESSAGE: &str =
    "Cannot make calls to a disabled service; use the lifecycle controls to enable the service.";
pub const ERROR_MESSAGE: &str = "Cannot make calls to a service in an error state; use the lifecycle \
     controls to acknowledge and reset the service.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Enabled,
    Disabled,
    Error { reason: String, at: DateTime<Utc> },
}

impl LifecycleState {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
            Self::Error { .. } => "ERROR",
        }
    }
}

/// Enable/disable/error state of one service instance.
///
/// Business calls go through [`Lifecycle::admit`] and keep the returned
/// [`Admission`] alive while they run; transitions wait for in-flight
/// admissions, admissions never wait for each other.
#[derive(Debug)]
pub struct Lifecycle {
    service: String,
    state: RwLock<LifecycleState>,
    admitted: AtomicU64,
    request_quota: Option<u64>,
}

/// Proof that a business call was admitted while the service was enabled.
#[must_use]
pub struct Admission<'a> {
    _state: RwLockReadGuard<'a, LifecycleState>,
}

impl Lifecycle {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            state: RwLock::new(LifecycleState::Enabled),
            admitted: AtomicU64::new(0),
            request_quota: None,
        }
    }

    /// Trip into the error state once `quota` requests have been admitted.
    pub fn with_request_quota(mut self, quota: Option<u64>) -> Self {
        self.request_quota = quota;
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub async fn state(&self) -> LifecycleState {
        self.state.read().await.clone()
    }

    /// Requests admitted since start or since the last error reset.
    pub fn admitted_requests(&self) -> u64 {
        self.admitted.load(Ordering::SeqCst)
    }

    pub async fn enable(&self) {
        let mut state = self.state.write().await;
        match &*state {
            LifecycleState::Enabled => {
                debug!(service = %self.service, "already enabled");
                return;
            }
            LifecycleState::Error { .. } => {
                info!(service = %self.service, "error acknowledged, resetting request count");
                self.admitted.store(0, Ordering::SeqCst);
            }
            LifecycleState::Disabled => {}
        }
        *state = LifecycleState::Enabled;
        info!(service = %self.service, "service enabled");
    }

    pub async fn disable(&self) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        match &*state {
            LifecycleState::Error { .. } => {
                warn!(service = %self.service, "disable rejected while in error state");
                Err(ServiceError::InvalidTransition(
                    "cannot disable a service in error state; enable it first to acknowledge the error".into(),
                ))
            }
            LifecycleState::Disabled => Ok(()),
            LifecycleState::Enabled => {
                *state = LifecycleState::Disabled;
                info!(service = %self.service, "service disabled");
                Ok(())
            }
        }
    }

    /// Any state to `Error`. The caller holds the write lock on the state.
    pub(crate) fn trip_error(&self, state: &mut LifecycleState, reason: impl Into<String>) {
        let reason = reason.into();
        error!(service = %self.service, %reason, "service entering error state");
        *state = LifecycleState::Error { reason, at: Utc::now() };
    }

    #[cfg(test)]
    pub(crate) async fn force_error(&self, reason: &str) {
        let mut state = self.state.write().await;
        self.trip_error(&mut state, reason);
    }

    /// Admit a business call or reject it with `FailedPrecondition`.
    pub async fn admit(&self) -> Result<Admission<'_>, ServiceError> {
        let state = self.state.read().await;
        match &*state {
            LifecycleState::Enabled => {}
            LifecycleState::Disabled => {
                error!(service = %self.service, "call rejected: service disabled");
                return Err(ServiceError::FailedPrecondition(DISABLED_MESSAGE.into()));
            }
            LifecycleState::Error { .. } => {
                error!(service = %self.service, "call rejected: service in error state");
                return Err(ServiceError::FailedPrecondition(ERROR_MESSAGE.into()));
            }
        }

        let prior = self.admitted.fetch_add(1, Ordering::SeqCst);
        if let Some(quota) = self.request_quota {
            if prior >= quota {
                drop(state);
                self.trip_on_quota(quota).await;
                return Err(ServiceError::FailedPrecondition(ERROR_MESSAGE.into()));
            }
        }
        debug!(service = %self.service, admitted = prior + 1, "call admitted");
        Ok(Admission { _state: state })
    }

    async fn trip_on_quota(&self, quota: u64) {
        let mut state = self.state.write().await;
        // an enable may have reset the count while the write lock was pending
        if *state != LifecycleState::Enabled || self.admitted.load(Ordering::SeqCst) <= quota {
            return;
        }
        self.trip_error(
            &mut state,
            format!("request quota of {quota} reached; enable the service to reset the request count"),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn is_precondition(res: &Result<Admission<'_>, ServiceError>, msg: &str) -> bool {
        matches!(res, Err(ServiceError::FailedPrecondition(m)) if m == msg)
    }

    #[tokio::test]
    async fn starts_enabled_and_admits() {
        let lc = Lifecycle::new("svc");
        assert_eq!(lc.state().await, LifecycleState::Enabled);
        assert!(lc.admit().await.is_ok());
        assert_eq!(lc.admitted_requests(), 1);
    }

    #[tokio::test]
    async fn disable_and_enable_round_trip() -> Result<(), ServiceError> {
        let lc = Lifecycle::new("svc");
        lc.disable().await?;
        assert_eq!(lc.state().await, LifecycleState::Disabled);
        assert!(is_precondition(&lc.admit().await, DISABLED_MESSAGE));

        // no-op transitions
        lc.disable().await?;
        assert_eq!(lc.state().await, LifecycleState::Disabled);

        lc.enable().await;
        lc.enable().await;
        assert_eq!(lc.state().await, LifecycleState::Enabled);
        assert!(lc.admit().await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn error_state_rejects_disable_until_enabled() -> Result<(), ServiceError> {
        let lc = Lifecycle::new("svc");
        lc.force_error("boom").await;
        let state = lc.state().await;
        assert_eq!(state.code(), "ERROR");
        assert!(matches!(state, LifecycleState::Error { ref reason, .. } if reason == "boom"));

        assert!(is_precondition(&lc.admit().await, ERROR_MESSAGE));
        assert!(matches!(lc.disable().await, Err(ServiceError::InvalidTransition(_))));
        assert_eq!(lc.state().await.code(), "ERROR");

        lc.enable().await;
        assert_eq!(lc.state().await, LifecycleState::Enabled);
        lc.disable().await?;
        Ok(())
    }

    #[tokio::test]
    async fn quota_trips_error_and_enable_resets_count() {
        let lc = Lifecycle::new("random").with_request_quota(Some(2));
        assert!(lc.admit().await.is_ok());
        assert!(lc.admit().await.is_ok());

        // third call trips the service
        assert!(is_precondition(&lc.admit().await, ERROR_MESSAGE));
        assert_eq!(lc.state().await.code(), "ERROR");
        assert!(is_precondition(&lc.admit().await, ERROR_MESSAGE));

        lc.enable().await;
        assert_eq!(lc.admitted_requests(), 0);
        assert!(lc.admit().await.is_ok());
        assert!(lc.admit().await.is_ok());
        assert!(lc.admit().await.is_err());
    }

    #[tokio::test]
    async fn quota_trip_records_reason_and_time() {
        let before = Utc::now();
        let lc = Lifecycle::new("random").with_request_quota(Some(0));
        assert!(is_precondition(&lc.admit().await, ERROR_MESSAGE));
        match lc.state().await {
            LifecycleState::Error { reason, at } => {
                assert!(reason.contains("request quota of 0 reached"), "{reason}");
                assert!(at >= before);
            }
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn trip_from_disabled_enters_error() {
        let lc = Lifecycle::new("svc");
        lc.disable().await.unwrap();
        lc.force_error("disk gone").await;
        assert!(matches!(lc.state().await, LifecycleState::Error { ref reason, .. } if reason == "disk gone"));
    }

    #[tokio::test]
    async fn transitions_wait_for_in_flight_admissions() -> Result<(), anyhow::Error> {
        let lc = Arc::new(Lifecycle::new("svc"));
        let first = lc.admit().await?;
        // concurrent admissions do not block each other
        let second = lc.admit().await?;

        let lc2 = Arc::clone(&lc);
        let pending = tokio::spawn(async move { lc2.disable().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        drop(first);
        drop(second);
        pending.await??;
        assert_eq!(lc.state().await, LifecycleState::Disabled);
        Ok(())
    }

    #[test]
    fn state_serializes_with_tag() {
        let v = serde_json::to_value(LifecycleState::Disabled).unwrap();
        assert_eq!(v, serde_json::json!({"state": "DISABLED"}));
        let err = LifecycleState::Error { reason: "r".into(), at: Utc::now() };
        let v = serde_json::to_value(err).unwrap();
        assert_eq!(v["state"], "ERROR");
        assert_eq!(v["reason"], "r");
        assert!(v["at"].is_string());
    }
}
